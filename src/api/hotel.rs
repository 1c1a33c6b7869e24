//! Typed hotel endpoints

use super::client::ApiClient;
use super::error::ClientError;
use super::transport::Transport;
use crate::data::{Availability, CreateEReservationRequest, EReservation, Room, RoomType};
use crate::dates::StayPeriod;

pub const ROOM_TYPES_PATH: &str = "/api/partner/hotel/room-types";
pub const ROOMS_PATH: &str = "/api/partner/hotel/rooms";
pub const AVAILABILITY_PATH: &str = "/api/partner/hotel/availability";
pub const E_RESERVATIONS_PATH: &str = "/api/partner/booking/e-reservations";

impl<T: Transport> ApiClient<T> {
    /// All room types. Cached.
    pub async fn room_types(&self) -> Result<Vec<RoomType>, ClientError> {
        self.get(ROOM_TYPES_PATH, &[], true).await
    }

    /// A single room type. Cached.
    pub async fn room_type(&self, id: u64) -> Result<RoomType, ClientError> {
        self.get(&format!("{}/{}", ROOM_TYPES_PATH, id), &[], true)
            .await
    }

    /// All rooms. Cached.
    pub async fn rooms(&self) -> Result<Vec<Room>, ClientError> {
        self.get(ROOMS_PATH, &[], true).await
    }

    /// Room types available for a validated stay. Never cached.
    pub async fn availability(&self, stay: &StayPeriod) -> Result<Vec<Availability>, ClientError> {
        let params = [
            ("checkIn", stay.check_in.format("%Y-%m-%d").to_string()),
            ("checkOut", stay.check_out.format("%Y-%m-%d").to_string()),
            ("adults", stay.adults.to_string()),
            ("children", stay.children.to_string()),
        ];
        self.get(AVAILABILITY_PATH, &params, false).await
    }

    /// Creates a reservation from a caller-assembled request
    pub async fn create_e_reservation(
        &self,
        request: &CreateEReservationRequest,
    ) -> Result<EReservation, ClientError> {
        self.post(E_RESERVATIONS_PATH, request).await
    }
}

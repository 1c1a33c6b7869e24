//! Electronic reservation records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::room::{Rate, RoomType};

/// Guest counts for one booked room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCounts {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infants: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub date: String,
    pub amount: f64,
}

/// A room line of a created reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRoom {
    pub id: u64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rate_id: Option<u64>,
    pub room_type_id: u64,
    #[serde(default)]
    pub booking_nb_persons: HashMap<String, u32>,
    #[serde(default)]
    pub nb_persons: Option<PersonCounts>,
    #[serde(default)]
    pub daily_rates: Vec<DailyRate>,
    #[serde(default)]
    pub room_type: Option<RoomType>,
    #[serde(default)]
    pub rate: Option<Rate>,
}

/// Reservation as returned by the upstream after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EReservation {
    pub id: u64,
    #[serde(default)]
    pub booking_id: Option<u64>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub ota_reference: Option<String>,
    pub checkin: String,
    pub checkout: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub customer_firstname: Option<String>,
    #[serde(default)]
    pub customer_lastname: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_country: Option<String>,
    #[serde(default)]
    pub channel_name: Option<String>,
    #[serde(default)]
    pub state: Option<i64>,
    #[serde(default)]
    pub payment_amount: Option<f64>,
    #[serde(default)]
    pub insurance_amount: Option<f64>,
    #[serde(default)]
    pub booking_rooms: Vec<BookingRoom>,
}

/// A room requested in a new reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EReservationRoom {
    pub room_type_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Name of the guest staying in the room
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooming: Option<String>,
    pub nb_persons: PersonCounts,
}

/// Body of a reservation creation request
///
/// Assembled by the caller; the client sends it as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateEReservationRequest {
    /// `YYYY-MM-DD`
    pub checkin: String,
    /// `YYYY-MM-DD`
    pub checkout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_civility_id: Option<u32>,
    pub customer_firstname: String,
    pub customer_lastname: String,
    pub customer_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    /// ISO 3166-1 alpha-2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ota_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_amount: Option<f64>,
    pub booking_rooms: Vec<EReservationRoom>,
}

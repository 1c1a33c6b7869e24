//! Typed records exchanged with the booking API
//!
//! Fields the upstream may omit are `Option`s (or default to empty) so that a
//! sparse response still decodes.

pub mod availability;
pub mod reservation;
pub mod room;

pub use availability::{sort_by_price, Availability};
pub use reservation::{
    BookingRoom, CreateEReservationRequest, DailyRate, EReservation, EReservationRoom,
    PersonCounts,
};
pub use room::{bookable_room_types, Rate, Room, RoomType};

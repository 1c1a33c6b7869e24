//! Availability search results

use serde::{Deserialize, Serialize};

use super::room::{Rate, RoomType};

/// Availability of one room type over the searched period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub room_type_id: u64,
    #[serde(default)]
    pub room_type: Option<RoomType>,
    /// Lowest number of free rooms across the period
    #[serde(default, rename = "availableRooms", alias = "available_rooms")]
    pub available_rooms: Option<u32>,
    /// Dates covered by this record
    #[serde(default)]
    pub dates: Vec<String>,
    /// Total price for the stay
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub rate: Option<Rate>,
}

/// Sorts availabilities by total price, unpriced entries last
pub fn sort_by_price(availabilities: &mut [Availability]) {
    availabilities.sort_by(|a, b| match (a.price, b.price) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

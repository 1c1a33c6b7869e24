//! Room and room type records

use serde::{Deserialize, Serialize};

/// A category of room offered by the hotel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: u64,
    pub label: String,
    #[serde(default)]
    pub subject_to_pricing: Option<bool>,
    #[serde(default)]
    pub nb_persons_min: Option<u32>,
    #[serde(default)]
    pub nb_persons_max: Option<u32>,
    /// Shown to guests
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub color: Option<String>,
    /// May contain HTML
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub ical_url: Option<String>,
    #[serde(default)]
    pub pictures: Vec<String>,
}

impl RoomType {
    /// Public and not deleted
    pub fn is_bookable(&self) -> bool {
        self.public && !self.deleted
    }
}

/// A physical room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: u64,
    pub label: String,
    #[serde(default)]
    pub nb_persons_max: Option<u32>,
    pub room_type_id: u64,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub room_type: Option<RoomType>,
}

/// A pricing plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub id: u64,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rate_per_person: Option<bool>,
    #[serde(default)]
    pub nb_persons_min: Option<u32>,
    #[serde(default)]
    pub nb_persons_max: Option<u32>,
}

/// Public, non-deleted room types ordered by rank
pub fn bookable_room_types(mut room_types: Vec<RoomType>) -> Vec<RoomType> {
    room_types.retain(RoomType::is_bookable);
    room_types.sort_by_key(|rt| rt.rank);
    room_types
}

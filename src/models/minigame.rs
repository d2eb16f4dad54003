use serde::{Deserialize, Serialize};

/// Catalog entry for a health minigame. Pure display data; play counts live
/// on the user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minigame {
    pub id: String,
    pub name: String,
    pub description: String,
    pub difficulty_level: String,
    pub time_to_play: String,
    pub points_to_earn: i32,
    pub image_name: String,
}

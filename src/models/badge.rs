use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::BadgeCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Badge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_name: String,
    pub date_earned: DateTime<Utc>,
    pub category: BadgeCategory,
    pub points: i32,
    pub is_unlocked: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::HealthInfoCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthInfo {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: HealthInfoCategory,
    pub image_url: Option<String>,
    pub publish_date: DateTime<Utc>,
    pub is_read: bool,
    pub read_date: Option<DateTime<Utc>>,
    pub awards_badge: bool,
    pub related_badge_id: Option<Uuid>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationType;

/// A display-ready notification record. Derived from prescription, badge or
/// health-info events; never the source of truth for any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppNotification {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub prescription_id: Option<Uuid>,
    pub action_url: Option<String>,
    pub related_badge_id: Option<Uuid>,
    pub related_health_info_id: Option<Uuid>,
}

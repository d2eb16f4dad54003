use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::badge::Badge;
use super::enums::UserType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: DateTime<Utc>,
    pub phone_number: String,
    pub health_conditions: Vec<String>,
    pub allergies: Vec<String>,
    pub family_members: Vec<FamilyMember>,
    pub profile_image_name: Option<String>,
    pub user_type: UserType,

    // Pharmacist specific fields
    pub pharmacy_name: Option<String>,
    pub license_number: Option<String>,

    // Gamification counters
    pub adherence_score: i32,
    pub badges: Vec<Badge>,
    pub health_info_read: Vec<Uuid>,
    pub minigames_played: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: Uuid,
    /// e.g. "Child", "Parent", "Spouse"
    pub relationship: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: DateTime<Utc>,
    pub health_conditions: Vec<String>,
    pub allergies: Vec<String>,
}

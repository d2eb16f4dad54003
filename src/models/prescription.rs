use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{PrescriptionStatus, PrescriptionType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub rx_number: String,
    pub medication_name: String,
    pub dosage: String,
    pub instructions: String,
    pub prescribed_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub refills_remaining: u32,
    pub status: PrescriptionStatus,
    pub prescription_type: PrescriptionType,
    /// Patient or family member the prescription belongs to.
    pub for_user: Uuid,
    pub for_user_name: String,
    /// Append-only audit trail; never reordered or mutated in place.
    pub status_history: Vec<StatusUpdate>,
    pub notes: Option<String>,
    /// Legacy single-string field, mirrored from the last pharmacist chat
    /// message for old clients. The `messages` thread is canonical.
    pub pharmacist_message: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub image_url: Option<String>,
    pub total_cost: Option<f64>,
    pub insurance_coverage: Option<f64>,
    pub copay_amount: Option<f64>,
    pub dispensing_fee: Option<f64>,
    pub notified_on_status_change: bool,
    pub adherence_percentage: f64,
    pub last_taken: Option<DateTime<Utc>>,
    pub next_due_date: Option<DateTime<Utc>>,
}

impl Prescription {
    /// Most recent pharmacist-authored chat message, falling back to the
    /// legacy field when the thread is empty.
    pub fn latest_pharmacist_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| !m.is_from_user)
            .map(|m| m.content.as_str())
            .or(self
                .pharmacist_message
                .as_deref()
                .filter(|m| !m.is_empty()))
    }
}

/// Immutable historical record of one status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: PrescriptionStatus,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

/// One entry in a prescription's chat thread. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// true if from the patient, false if from the pharmacist.
    pub is_from_user: bool,
}

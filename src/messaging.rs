//! Pharmacist-initiated chat gating.
//!
//! A prescription's chat thread is one-sided until the pharmacy opens it:
//! the patient may only reply after at least one pharmacist message exists.
//! Unread state is inferred from message-count parity rather than a read
//! marker, so "read but not yet replied" still shows as unread.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{ChatMessage, Prescription};
use crate::workflow::PolicyError;

/// Whether the patient is allowed to reply on this thread.
pub fn can_user_reply(p: &Prescription) -> bool {
    p.messages.iter().any(|m| !m.is_from_user)
}

/// Append a patient reply. Fails with `NotInitiated` while the pharmacist
/// has not opened the conversation; the input snapshot is never mutated, so
/// a failed call is a no-op for the caller.
pub fn append_user_reply(p: &Prescription, content: &str) -> Result<Prescription, PolicyError> {
    if !can_user_reply(p) {
        return Err(PolicyError::NotInitiated);
    }

    let mut updated = p.clone();
    updated.messages.push(ChatMessage {
        id: Uuid::new_v4(),
        content: content.into(),
        timestamp: Utc::now(),
        is_from_user: true,
    });
    Ok(updated)
}

/// Append a pharmacist message. Unconditional: this is what opens the
/// thread. The content is also mirrored into the legacy single-string
/// field, which old clients still read.
pub fn append_pharmacist_message(p: &Prescription, content: &str) -> Prescription {
    let mut updated = p.clone();
    updated.pharmacist_message = Some(content.to_string());
    updated.messages.push(ChatMessage {
        id: Uuid::new_v4(),
        content: content.into(),
        timestamp: Utc::now(),
        is_from_user: false,
    });
    updated
}

/// Unread heuristic: more pharmacist messages than patient replies. Falls
/// back to the legacy field when the thread is empty.
pub fn has_unread(p: &Prescription) -> bool {
    if p.messages.is_empty() {
        return p
            .pharmacist_message
            .as_deref()
            .is_some_and(|m| !m.is_empty());
    }

    let from_pharmacist = p.messages.iter().filter(|m| !m.is_from_user).count();
    let from_user = p.messages.len() - from_pharmacist;
    from_pharmacist > from_user
}

/// Prescriptions carrying any pharmacist conversation, for the inbox view.
pub fn with_messages(prescriptions: &[Prescription]) -> Vec<&Prescription> {
    prescriptions
        .iter()
        .filter(|p| {
            !p.messages.is_empty()
                || p.pharmacist_message
                    .as_deref()
                    .is_some_and(|m| !m.is_empty())
        })
        .collect()
}

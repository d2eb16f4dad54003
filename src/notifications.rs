//! Notification derivation and dispatch.
//!
//! Derivation is a pure mapping from domain events to display-ready
//! records. Dispatch is fire-and-forget behind a trait: the core assumes
//! no delivery guarantee and implementations must never propagate errors
//! back into a workflow operation.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::insert_notification;
use crate::models::enums::{NotificationType, PrescriptionStatus};
use crate::models::{AppNotification, Badge, HealthInfo, Prescription};

fn notification(
    notification_type: NotificationType,
    title: &str,
    message: String,
) -> AppNotification {
    AppNotification {
        id: Uuid::new_v4(),
        notification_type,
        title: title.into(),
        message,
        timestamp: Utc::now(),
        is_read: false,
        prescription_id: None,
        action_url: None,
        related_badge_id: None,
        related_health_info_id: None,
    }
}

/// Derive the notification for a prescription's current state.
///
/// A pending pharmacist message always wins over the status mapping: when
/// the pharmacy has something to say, that is the notification, whatever
/// fulfillment stage the prescription is at.
pub fn notification_for_status(p: &Prescription) -> AppNotification {
    let mut derived = match p.status {
        PrescriptionStatus::RequestReceived => notification(
            NotificationType::RequestReceived,
            "Prescription Request Received",
            format!(
                "Your {} for {} has been received",
                p.prescription_type.as_str().to_lowercase(),
                p.medication_name
            ),
        ),
        PrescriptionStatus::PrepPackaging => notification(
            NotificationType::PrepPackaging,
            "Prescription Being Prepared",
            format!("Your prescription for {} is being prepared", p.medication_name),
        ),
        PrescriptionStatus::ReadyForPickup => notification(
            NotificationType::ReadyForPickup,
            "Ready for Pickup",
            format!("Your prescription for {} is ready for pickup", p.medication_name),
        ),
        _ => notification(
            NotificationType::Info,
            "Prescription Update",
            format!(
                "Your prescription for {} has been updated to: {}",
                p.medication_name,
                p.status.as_str()
            ),
        ),
    };

    if let Some(message) = p.latest_pharmacist_message() {
        derived.notification_type = NotificationType::PharmacistMessage;
        derived.title = "Message from Pharmacist".into();
        derived.message = message.to_string();
    }

    derived.prescription_id = Some(p.id);
    derived
}

/// Reminder to take a due dose.
pub fn adherence_reminder(p: &Prescription) -> AppNotification {
    let mut n = notification(
        NotificationType::AdherenceReminder,
        "Medication Reminder",
        format!("Time to take your {} ({})", p.medication_name, p.dosage),
    );
    n.prescription_id = Some(p.id);
    n
}

pub fn badge_notification(badge: &Badge) -> AppNotification {
    let mut n = notification(
        NotificationType::Badge,
        "New Badge Earned!",
        format!("Congratulations! You've earned the '{}' badge.", badge.title),
    );
    n.related_badge_id = Some(badge.id);
    n
}

pub fn health_info_notification(info: &HealthInfo) -> AppNotification {
    let mut n = notification(
        NotificationType::HealthInfo,
        "New Health Information",
        format!("New article: {}", info.title),
    );
    n.related_health_info_id = Some(info.id);
    n
}

/// Fire-and-forget notification boundary. The core owes the patient a
/// notification when a notify-worthy status lands; whether it actually
/// arrives is this collaborator's problem.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, notification: AppNotification);
}

/// Dispatcher that only logs. Useful in tests and headless tooling.
#[derive(Debug, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    fn notify(&self, notification: AppNotification) {
        tracing::info!(
            kind = notification.notification_type.as_str(),
            title = %notification.title,
            "notification dispatched"
        );
    }
}

/// Dispatcher that persists into the local notification feed. Failures are
/// logged and swallowed; a lost notification must not fail the workflow
/// operation that produced it.
pub struct FeedDispatcher {
    conn: Arc<Mutex<Connection>>,
}

impl FeedDispatcher {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl NotificationDispatcher for FeedDispatcher {
    fn notify(&self, notification: AppNotification) {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = insert_notification(&conn, &notification) {
            tracing::warn!(
                kind = notification.notification_type.as_str(),
                error = %e,
                "failed to persist notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{list_notifications, unread_count};
    use crate::db::sqlite::open_memory_database;
    use crate::messaging::append_pharmacist_message;
    use crate::models::enums::BadgeCategory;
    use crate::seed;

    fn base() -> Prescription {
        seed::sample_prescription(Uuid::new_v4(), "John Doe")
    }

    #[test]
    fn notify_worthy_statuses_map_to_dedicated_types() {
        let mut p = base();

        p.status = PrescriptionStatus::RequestReceived;
        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::RequestReceived);
        assert!(n.message.contains("refill") || n.message.contains("new prescription"));

        p.status = PrescriptionStatus::PrepPackaging;
        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::PrepPackaging);
        assert_eq!(n.title, "Prescription Being Prepared");

        p.status = PrescriptionStatus::ReadyForPickup;
        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::ReadyForPickup);
        assert_eq!(n.prescription_id, Some(p.id));
    }

    #[test]
    fn other_statuses_map_to_generic_info() {
        let mut p = base();
        p.status = PrescriptionStatus::Billing;
        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::Info);
        assert!(n.message.contains("Billing"));
    }

    #[test]
    fn pharmacist_message_takes_priority_over_status() {
        let mut p = base();
        p.status = PrescriptionStatus::ReadyForPickup;
        let p = append_pharmacist_message(&p, "Please call before pickup");

        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::PharmacistMessage);
        assert_eq!(n.title, "Message from Pharmacist");
        assert_eq!(n.message, "Please call before pickup");
    }

    #[test]
    fn legacy_field_alone_also_takes_priority() {
        let mut p = base();
        p.status = PrescriptionStatus::PrepPackaging;
        p.pharmacist_message = Some("Out of stock, substitute offered".into());

        let n = notification_for_status(&p);
        assert_eq!(n.notification_type, NotificationType::PharmacistMessage);
        assert_eq!(n.message, "Out of stock, substitute offered");
    }

    #[test]
    fn reminder_names_medication_and_dose() {
        let p = base();
        let n = adherence_reminder(&p);
        assert_eq!(n.notification_type, NotificationType::AdherenceReminder);
        assert!(n.message.contains(&p.medication_name));
        assert!(n.message.contains(&p.dosage));
    }

    #[test]
    fn badge_and_health_info_notifications_link_back() {
        let badge = Badge {
            id: Uuid::new_v4(),
            title: "Perfect Adherence".into(),
            description: String::new(),
            image_name: "badge_adherence_star".into(),
            date_earned: Utc::now(),
            category: BadgeCategory::Adherence,
            points: 100,
            is_unlocked: true,
        };
        let n = badge_notification(&badge);
        assert_eq!(n.related_badge_id, Some(badge.id));
        assert!(n.message.contains("Perfect Adherence"));

        let info = seed::sample_health_infos().remove(0);
        let n = health_info_notification(&info);
        assert_eq!(n.related_health_info_id, Some(info.id));
        assert!(n.message.contains(&info.title));
    }

    #[test]
    fn feed_dispatcher_persists_into_the_feed() {
        let conn = Arc::new(Mutex::new(open_memory_database().unwrap()));
        let dispatcher = FeedDispatcher::new(Arc::clone(&conn));

        let mut p = base();
        p.status = PrescriptionStatus::ReadyForPickup;
        dispatcher.notify(notification_for_status(&p));

        let guard = conn.lock().unwrap();
        let feed = list_notifications(&guard).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_type, NotificationType::ReadyForPickup);
        assert_eq!(unread_count(&guard).unwrap(), 1);
    }
}

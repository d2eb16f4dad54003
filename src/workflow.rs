//! Prescription status workflow: the pure core of the fulfillment
//! lifecycle.
//!
//! Every function here is a synchronous transformation over an immutable
//! prescription snapshot: no I/O, no clocks beyond stamping `Utc::now()`
//! into new history entries. Both store adapters and the service layer
//! consume these functions instead of duplicating the rules.

use chrono::{Duration, Utc};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::models::enums::{PrescriptionStatus, PrescriptionType};
use crate::models::{Prescription, StatusUpdate};

/// Domain-rule violations. Always recoverable: the caller is informed and
/// no mutation has occurred.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    #[error("prescription is not eligible for a refill")]
    Ineligible,

    #[error("prescription is not ready for pickup")]
    NotReady,

    #[error("pharmacist has not initiated this conversation")]
    NotInitiated,
}

/// Move a prescription to `new_status`, appending to its audit trail.
///
/// Any status may follow any other; the enum order drives the progress
/// tracker, not transition validation. Statuses the patient is notified
/// about additionally raise the `notified_on_status_change` flag; the
/// notification itself is dispatched at the service boundary.
pub fn advance_status(
    p: &Prescription,
    new_status: PrescriptionStatus,
    message: Option<&str>,
) -> Prescription {
    let mut updated = p.clone();
    updated.status = new_status;
    updated.status_history.push(StatusUpdate {
        status: new_status,
        timestamp: Utc::now(),
        message: message.map(String::from),
    });
    if new_status.triggers_notification() {
        updated.notified_on_status_change = true;
    }
    updated
}

/// Derive a fresh refill prescription from a completed one.
///
/// The original record is untouched; the refill starts its own audit trail
/// and carries no chat history from the parent.
pub fn request_refill(p: &Prescription) -> Result<Prescription, PolicyError> {
    if p.status != PrescriptionStatus::Completed || p.refills_remaining == 0 {
        return Err(PolicyError::Ineligible);
    }

    let mut refill = p.clone();
    refill.id = Uuid::new_v4();
    refill.rx_number = generate_rx_number();
    refill.status = PrescriptionStatus::RequestReceived;
    refill.prescription_type = PrescriptionType::Refill;
    refill.prescribed_date = Utc::now();
    refill.refills_remaining = p.refills_remaining - 1;
    refill.status_history = vec![StatusUpdate {
        status: PrescriptionStatus::RequestReceived,
        timestamp: Utc::now(),
        message: Some("Refill request received".into()),
    }];
    refill.notified_on_status_change = true;
    refill.pharmacist_message = None;
    refill.messages = Vec::new();
    Ok(refill)
}

/// Patient confirms the pickup of a prescription at the counter.
pub fn confirm_pickup(p: &Prescription) -> Result<Prescription, PolicyError> {
    if p.status != PrescriptionStatus::ReadyForPickup {
        return Err(PolicyError::NotReady);
    }
    Ok(advance_status(
        p,
        PrescriptionStatus::Completed,
        Some("Prescription picked up by patient"),
    ))
}

/// Record a dose taken now, with the caller-computed adherence percentage.
/// The next due date is one day out; dosing schedules are not parsed from
/// the instruction text.
pub fn record_dose(p: &Prescription, adherence_percentage: f64) -> Prescription {
    let now = Utc::now();
    let mut updated = p.clone();
    updated.adherence_percentage = adherence_percentage;
    updated.last_taken = Some(now);
    updated.next_due_date = Some(now + Duration::days(1));
    updated
}

/// Pharmacy-style display number: "RX" plus six digits.
pub fn generate_rx_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("RX{n}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn base() -> Prescription {
        seed::sample_prescription(Uuid::new_v4(), "John Doe")
    }

    #[test]
    fn advance_appends_history_and_sets_status() {
        let p = base();
        let before_len = p.status_history.len();
        let started = Utc::now();

        let updated = advance_status(&p, PrescriptionStatus::Billing, Some("sent to insurer"));

        assert_eq!(updated.status, PrescriptionStatus::Billing);
        assert_eq!(updated.status_history.len(), before_len + 1);
        let last = updated.status_history.last().unwrap();
        assert_eq!(last.status, PrescriptionStatus::Billing);
        assert_eq!(last.message.as_deref(), Some("sent to insurer"));
        assert!(last.timestamp >= started && last.timestamp <= Utc::now());
        // Input snapshot untouched.
        assert_eq!(p.status_history.len(), before_len);
    }

    #[test]
    fn advance_sets_notified_flag_only_for_notify_worthy_statuses() {
        let p = base();
        assert!(!p.notified_on_status_change);

        let silent = advance_status(&p, PrescriptionStatus::Billing, None);
        assert!(!silent.notified_on_status_change);

        let notified = advance_status(&p, PrescriptionStatus::ReadyForPickup, None);
        assert!(notified.notified_on_status_change);

        // Once raised, a later silent transition does not clear the flag.
        let still = advance_status(&notified, PrescriptionStatus::Completed, None);
        assert!(still.notified_on_status_change);
    }

    #[test]
    fn refill_requires_completed_status() {
        for status in PrescriptionStatus::ALL {
            let mut p = base();
            p.status = status;
            p.refills_remaining = 2;
            let result = request_refill(&p);
            if status == PrescriptionStatus::Completed {
                assert!(result.is_ok());
            } else {
                assert_eq!(result.unwrap_err(), PolicyError::Ineligible);
            }
        }
    }

    #[test]
    fn refill_requires_refills_remaining() {
        let mut p = base();
        p.status = PrescriptionStatus::Completed;
        p.refills_remaining = 0;
        assert_eq!(request_refill(&p).unwrap_err(), PolicyError::Ineligible);
    }

    #[test]
    fn refill_derives_a_fresh_record() {
        let mut p = base();
        p.status = PrescriptionStatus::Completed;
        p.refills_remaining = 2;
        p.pharmacist_message = Some("see note".into());
        p.messages = vec![crate::models::ChatMessage {
            id: Uuid::new_v4(),
            content: "hello".into(),
            timestamp: Utc::now(),
            is_from_user: false,
        }];

        let refill = request_refill(&p).unwrap();

        assert_ne!(refill.id, p.id);
        assert_ne!(refill.rx_number, p.rx_number);
        assert_eq!(refill.status, PrescriptionStatus::RequestReceived);
        assert_eq!(refill.prescription_type, PrescriptionType::Refill);
        assert_eq!(refill.refills_remaining, 1);
        assert_eq!(refill.status_history.len(), 1);
        assert_eq!(
            refill.status_history[0].message.as_deref(),
            Some("Refill request received")
        );
        assert!(refill.notified_on_status_change);
        assert!(refill.pharmacist_message.is_none());
        assert!(refill.messages.is_empty());
        // Medication details carry over.
        assert_eq!(refill.medication_name, p.medication_name);
        assert_eq!(refill.for_user, p.for_user);
    }

    #[test]
    fn pickup_requires_ready_status() {
        for status in PrescriptionStatus::ALL {
            let mut p = base();
            p.status = status;
            let result = confirm_pickup(&p);
            if status == PrescriptionStatus::ReadyForPickup {
                assert!(result.is_ok());
            } else {
                assert_eq!(result.unwrap_err(), PolicyError::NotReady);
            }
        }
    }

    #[test]
    fn pickup_is_an_advance_to_completed() {
        let mut p = base();
        p.status = PrescriptionStatus::ReadyForPickup;
        let before_len = p.status_history.len();

        let done = confirm_pickup(&p).unwrap();
        assert_eq!(done.status, PrescriptionStatus::Completed);
        assert_eq!(done.status_history.len(), before_len + 1);
        assert_eq!(
            done.status_history.last().unwrap().message.as_deref(),
            Some("Prescription picked up by patient")
        );
    }

    #[test]
    fn full_fulfillment_scenario() {
        // prepPackaging → readyForPickup → pickup confirmation.
        let mut p = base();
        p.status = PrescriptionStatus::PrepPackaging;
        p.status_history = vec![StatusUpdate {
            status: PrescriptionStatus::PrepPackaging,
            timestamp: Utc::now(),
            message: None,
        }];
        p.notified_on_status_change = false;

        let ready = advance_status(&p, PrescriptionStatus::ReadyForPickup, None);
        assert!(ready.notified_on_status_change);

        let done = confirm_pickup(&ready).unwrap();
        assert_eq!(done.status, PrescriptionStatus::Completed);
        assert_eq!(done.status_history.len(), 3);
        assert!(done.notified_on_status_change);
    }

    #[test]
    fn record_dose_updates_schedule() {
        let p = base();
        let before = Utc::now();
        let updated = record_dose(&p, 87.5);

        assert_eq!(updated.adherence_percentage, 87.5);
        let last_taken = updated.last_taken.unwrap();
        assert!(last_taken >= before);
        assert_eq!(updated.next_due_date.unwrap(), last_taken + Duration::days(1));
    }

    #[test]
    fn rx_numbers_have_display_shape() {
        for _ in 0..32 {
            let rx = generate_rx_number();
            assert!(rx.starts_with("RX"));
            assert_eq!(rx.len(), 8);
            assert!(rx[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}

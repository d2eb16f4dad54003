use crate::db::StorageError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Display strings match the wire format of the upstream document store.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StorageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StorageError::Decode {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(PrescriptionStatus {
    RequestReceived => "Request Received",
    Entered => "Entered into System",
    PharmacistCheck => "Pharmacist Check",
    PrepPackaging => "Prep & Packaging",
    Billing => "Billing",
    ReadyForPickup => "Ready for Pickup",
    Completed => "Completed",
});

impl PrescriptionStatus {
    /// All statuses in fulfillment order. The order is significant: it drives
    /// the progress tracker, not transition validation.
    pub const ALL: [PrescriptionStatus; 7] = [
        PrescriptionStatus::RequestReceived,
        PrescriptionStatus::Entered,
        PrescriptionStatus::PharmacistCheck,
        PrescriptionStatus::PrepPackaging,
        PrescriptionStatus::Billing,
        PrescriptionStatus::ReadyForPickup,
        PrescriptionStatus::Completed,
    ];

    /// Zero-based index of this status in the fulfillment order.
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// Whether `stage` has been reached once a prescription sits at `self`.
    pub fn is_reached(&self, stage: PrescriptionStatus) -> bool {
        stage.position() <= self.position()
    }

    /// The three statuses the patient is notified about.
    pub fn triggers_notification(&self) -> bool {
        matches!(
            self,
            PrescriptionStatus::RequestReceived
                | PrescriptionStatus::PrepPackaging
                | PrescriptionStatus::ReadyForPickup
        )
    }
}

str_enum!(PrescriptionType {
    New => "New Prescription",
    Refill => "Refill",
});

str_enum!(UserType {
    Patient => "patient",
    Pharmacist => "pharmacist",
});

str_enum!(BadgeCategory {
    Adherence => "Medication Adherence",
    Vaccine => "Vaccination",
    MedsCheck => "Medication Review",
    HealthInfo => "Health Information",
    Activity => "App Activity",
});

str_enum!(HealthInfoCategory {
    General => "General Health",
    Condition => "Health Condition",
    Medication => "Medication Information",
    Awareness => "Health Awareness",
    Nutrition => "Nutrition",
    Exercise => "Exercise",
});

str_enum!(NotificationType {
    RequestReceived => "Request Received",
    PrepPackaging => "Prep & Packaging",
    ReadyForPickup => "Ready for Pickup",
    PharmacistMessage => "Pharmacist Message",
    AdherenceReminder => "Medication Reminder",
    HealthInfo => "Health Information",
    Badge => "New Badge",
    Info => "Information",
});

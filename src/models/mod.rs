pub mod badge;
pub mod enums;
pub mod health_info;
pub mod minigame;
pub mod notification;
pub mod prescription;
pub mod user;

pub use badge::Badge;
pub use health_info::HealthInfo;
pub use minigame::Minigame;
pub use notification::AppNotification;
pub use prescription::{ChatMessage, Prescription, StatusUpdate};
pub use user::{FamilyMember, User};

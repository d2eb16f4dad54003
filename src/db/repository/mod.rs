pub mod notification;
pub mod prescription;
pub mod user;

pub use notification::*;
pub use prescription::*;
pub use user::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::StorageError;

// Column decode helpers shared by the repositories. Timestamps are stored
// as RFC 3339 TEXT, ids as canonical UUID strings.

pub(crate) fn parse_timestamp(s: &str, field: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| StorageError::Decode {
            field: field.into(),
            value: s.into(),
        })
}

pub(crate) fn parse_opt_timestamp(
    s: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    s.map(|v| parse_timestamp(&v, field)).transpose()
}

pub(crate) fn parse_uuid(s: &str, field: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(s).map_err(|_| StorageError::Decode {
        field: field.into(),
        value: s.into(),
    })
}

pub(crate) fn parse_opt_uuid(
    s: Option<String>,
    field: &str,
) -> Result<Option<Uuid>, StorageError> {
    s.map(|v| parse_uuid(&v, field)).transpose()
}

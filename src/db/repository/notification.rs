use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StorageError;
use crate::models::enums::NotificationType;
use crate::models::AppNotification;

use super::{parse_opt_uuid, parse_timestamp, parse_uuid};

pub fn insert_notification(conn: &Connection, n: &AppNotification) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO notifications (id, type, title, message, timestamp, is_read,
         prescription_id, action_url, related_badge_id, related_health_info_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            n.id.to_string(),
            n.notification_type.as_str(),
            n.title,
            n.message,
            n.timestamp.to_rfc3339(),
            n.is_read as i32,
            n.prescription_id.map(|id| id.to_string()),
            n.action_url,
            n.related_badge_id.map(|id| id.to_string()),
            n.related_health_info_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_notification(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<AppNotification>, StorageError> {
    let result = conn.query_row(
        "SELECT id, type, title, message, timestamp, is_read, prescription_id, action_url,
         related_badge_id, related_health_info_id
         FROM notifications WHERE id = ?1",
        params![id.to_string()],
        |row| Ok(notification_row_from_rusqlite(row)),
    );

    match result {
        Ok(row) => Ok(Some(notification_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The notification feed, newest first.
pub fn list_notifications(conn: &Connection) -> Result<Vec<AppNotification>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT id, type, title, message, timestamp, is_read, prescription_id, action_url,
         related_badge_id, related_health_info_id
         FROM notifications ORDER BY timestamp DESC",
    )?;
    let rows = stmt.query_map([], |row| Ok(notification_row_from_rusqlite(row)))?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(notification_from_row(row??)?);
    }
    Ok(notifications)
}

pub fn unread_count(conn: &Connection) -> Result<u32, StorageError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE is_read = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn mark_notification_read(conn: &Connection, id: &Uuid) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "notification",
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn mark_all_notifications_read(conn: &Connection) -> Result<(), StorageError> {
    conn.execute("UPDATE notifications SET is_read = 1", [])?;
    Ok(())
}

pub fn delete_notification(conn: &Connection, id: &Uuid) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM notifications WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

struct NotificationRow {
    id: String,
    notification_type: String,
    title: String,
    message: String,
    timestamp: String,
    is_read: i32,
    prescription_id: Option<String>,
    action_url: Option<String>,
    related_badge_id: Option<String>,
    related_health_info_id: Option<String>,
}

fn notification_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<NotificationRow, rusqlite::Error> {
    Ok(NotificationRow {
        id: row.get(0)?,
        notification_type: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        timestamp: row.get(4)?,
        is_read: row.get(5)?,
        prescription_id: row.get(6)?,
        action_url: row.get(7)?,
        related_badge_id: row.get(8)?,
        related_health_info_id: row.get(9)?,
    })
}

fn notification_from_row(row: NotificationRow) -> Result<AppNotification, StorageError> {
    Ok(AppNotification {
        id: parse_uuid(&row.id, "id")?,
        notification_type: NotificationType::from_str(&row.notification_type)?,
        title: row.title,
        message: row.message,
        timestamp: parse_timestamp(&row.timestamp, "timestamp")?,
        is_read: row.is_read != 0,
        prescription_id: parse_opt_uuid(row.prescription_id, "prescription_id")?,
        action_url: row.action_url,
        related_badge_id: parse_opt_uuid(row.related_badge_id, "related_badge_id")?,
        related_health_info_id: parse_opt_uuid(
            row.related_health_info_id,
            "related_health_info_id",
        )?,
    })
}

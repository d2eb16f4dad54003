use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StorageError;
use crate::models::enums::*;
use crate::models::*;

use super::{parse_timestamp, parse_uuid};

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO users (id, username, email, first_name, last_name, date_of_birth,
         phone_number, health_conditions, allergies, family_members, profile_image_name,
         user_type, pharmacy_name, license_number, adherence_score, badges, health_info_read,
         minigames_played)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.first_name,
            user.last_name,
            user.date_of_birth.to_rfc3339(),
            user.phone_number,
            serde_json::to_string(&user.health_conditions)?,
            serde_json::to_string(&user.allergies)?,
            serde_json::to_string(&user.family_members)?,
            user.profile_image_name,
            user.user_type.as_str(),
            user.pharmacy_name,
            user.license_number,
            user.adherence_score,
            serde_json::to_string(&user.badges)?,
            serde_json::to_string(&user.health_info_read)?,
            user.minigames_played,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, StorageError> {
    query_user(
        conn,
        "SELECT id, username, email, first_name, last_name, date_of_birth, phone_number,
         health_conditions, allergies, family_members, profile_image_name, user_type,
         pharmacy_name, license_number, adherence_score, badges, health_info_read,
         minigames_played
         FROM users WHERE id = ?1",
        &id.to_string(),
    )
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, StorageError> {
    query_user(
        conn,
        "SELECT id, username, email, first_name, last_name, date_of_birth, phone_number,
         health_conditions, allergies, family_members, profile_image_name, user_type,
         pharmacy_name, license_number, adherence_score, badges, health_info_read,
         minigames_played
         FROM users WHERE username = ?1",
        username,
    )
}

pub fn update_user(conn: &Connection, user: &User) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE users SET username = ?2, email = ?3, first_name = ?4, last_name = ?5,
         date_of_birth = ?6, phone_number = ?7, health_conditions = ?8, allergies = ?9,
         family_members = ?10, profile_image_name = ?11, user_type = ?12, pharmacy_name = ?13,
         license_number = ?14, adherence_score = ?15, badges = ?16, health_info_read = ?17,
         minigames_played = ?18
         WHERE id = ?1",
        params![
            user.id.to_string(),
            user.username,
            user.email,
            user.first_name,
            user.last_name,
            user.date_of_birth.to_rfc3339(),
            user.phone_number,
            serde_json::to_string(&user.health_conditions)?,
            serde_json::to_string(&user.allergies)?,
            serde_json::to_string(&user.family_members)?,
            user.profile_image_name,
            user.user_type.as_str(),
            user.pharmacy_name,
            user.license_number,
            user.adherence_score,
            serde_json::to_string(&user.badges)?,
            serde_json::to_string(&user.health_info_read)?,
            user.minigames_played,
        ],
    )?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "user",
            id: user.id.to_string(),
        });
    }
    Ok(())
}

fn query_user(conn: &Connection, sql: &str, key: &str) -> Result<Option<User>, StorageError> {
    let result = conn.query_row(sql, params![key], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            date_of_birth: row.get(5)?,
            phone_number: row.get(6)?,
            health_conditions: row.get(7)?,
            allergies: row.get(8)?,
            family_members: row.get(9)?,
            profile_image_name: row.get(10)?,
            user_type: row.get(11)?,
            pharmacy_name: row.get(12)?,
            license_number: row.get(13)?,
            adherence_score: row.get(14)?,
            badges: row.get(15)?,
            health_info_read: row.get(16)?,
            minigames_played: row.get(17)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct UserRow {
    id: String,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    date_of_birth: String,
    phone_number: String,
    health_conditions: String,
    allergies: String,
    family_members: String,
    profile_image_name: Option<String>,
    user_type: String,
    pharmacy_name: Option<String>,
    license_number: Option<String>,
    adherence_score: i32,
    badges: String,
    health_info_read: String,
    minigames_played: u32,
}

fn user_from_row(row: UserRow) -> Result<User, StorageError> {
    Ok(User {
        id: parse_uuid(&row.id, "id")?,
        username: row.username,
        email: row.email,
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: parse_timestamp(&row.date_of_birth, "date_of_birth")?,
        phone_number: row.phone_number,
        health_conditions: serde_json::from_str(&row.health_conditions)?,
        allergies: serde_json::from_str(&row.allergies)?,
        family_members: serde_json::from_str(&row.family_members)?,
        profile_image_name: row.profile_image_name,
        user_type: UserType::from_str(&row.user_type)?,
        pharmacy_name: row.pharmacy_name,
        license_number: row.license_number,
        adherence_score: row.adherence_score,
        badges: serde_json::from_str(&row.badges)?,
        health_info_read: serde_json::from_str(&row.health_info_read)?,
        minigames_played: row.minigames_played,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::seed;

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let user = seed::sample_user();
        insert_user(&conn, &user).unwrap();

        let loaded = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(loaded.username, user.username);
        assert_eq!(loaded.family_members.len(), user.family_members.len());
        assert_eq!(loaded.health_conditions, user.health_conditions);
        assert_eq!(loaded.user_type, UserType::Patient);
    }

    #[test]
    fn get_by_username() {
        let conn = open_memory_database().unwrap();
        let user = seed::sample_user();
        insert_user(&conn, &user).unwrap();

        let loaded = get_user_by_username(&conn, &user.username).unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert!(get_user_by_username(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let conn = open_memory_database().unwrap();
        let user = seed::sample_user();
        insert_user(&conn, &user).unwrap();

        let mut dup = seed::sample_user();
        dup.id = Uuid::new_v4();
        assert!(matches!(
            insert_user(&conn, &dup),
            Err(StorageError::Transport(_))
        ));
    }

    #[test]
    fn update_gamification_counters() {
        let conn = open_memory_database().unwrap();
        let mut user = seed::sample_user();
        insert_user(&conn, &user).unwrap();

        user.adherence_score = 92;
        user.minigames_played = 6;
        user.badges = seed::sample_badges();
        update_user(&conn, &user).unwrap();

        let loaded = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(loaded.adherence_score, 92);
        assert_eq!(loaded.minigames_played, 6);
        assert_eq!(loaded.badges.len(), user.badges.len());
    }

    #[test]
    fn update_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let user = seed::sample_user();
        assert!(matches!(
            update_user(&conn, &user),
            Err(StorageError::NotFound { .. })
        ));
    }
}

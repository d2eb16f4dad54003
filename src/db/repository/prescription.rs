use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::StorageError;
use crate::models::enums::*;
use crate::models::*;

use super::{parse_opt_timestamp, parse_timestamp, parse_uuid};

const COLUMNS: &str = "id, rx_number, medication_name, dosage, instructions, prescribed_date,
     expiry_date, refills_remaining, status, type, for_user, for_user_name, status_history,
     notes, pharmacist_message, messages, image_url, total_cost, insurance_coverage,
     copay_amount, dispensing_fee, notified_on_status_change, adherence_percentage,
     last_taken, next_due_date";

pub fn insert_prescription(conn: &Connection, p: &Prescription) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO prescriptions (id, rx_number, medication_name, dosage, instructions,
         prescribed_date, expiry_date, refills_remaining, status, type, for_user, for_user_name,
         status_history, notes, pharmacist_message, messages, image_url, total_cost,
         insurance_coverage, copay_amount, dispensing_fee, notified_on_status_change,
         adherence_percentage, last_taken, next_due_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
        params![
            p.id.to_string(),
            p.rx_number,
            p.medication_name,
            p.dosage,
            p.instructions,
            p.prescribed_date.to_rfc3339(),
            p.expiry_date.to_rfc3339(),
            p.refills_remaining,
            p.status.as_str(),
            p.prescription_type.as_str(),
            p.for_user.to_string(),
            p.for_user_name,
            serde_json::to_string(&p.status_history)?,
            p.notes,
            p.pharmacist_message,
            serde_json::to_string(&p.messages)?,
            p.image_url,
            p.total_cost,
            p.insurance_coverage,
            p.copay_amount,
            p.dispensing_fee,
            p.notified_on_status_change as i32,
            p.adherence_percentage,
            p.last_taken.map(|d| d.to_rfc3339()),
            p.next_due_date.map(|d| d.to_rfc3339()),
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Prescription>, StorageError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM prescriptions WHERE id = ?1"))?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(prescription_row_from_rusqlite(row))
    });

    match result {
        Ok(row) => Ok(Some(prescription_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Full-row update. Errors with NotFound when the id has never been created.
pub fn update_prescription(conn: &Connection, p: &Prescription) -> Result<(), StorageError> {
    let changed = conn.execute(
        "UPDATE prescriptions SET rx_number = ?2, medication_name = ?3, dosage = ?4,
         instructions = ?5, prescribed_date = ?6, expiry_date = ?7, refills_remaining = ?8,
         status = ?9, type = ?10, for_user = ?11, for_user_name = ?12, status_history = ?13,
         notes = ?14, pharmacist_message = ?15, messages = ?16, image_url = ?17,
         total_cost = ?18, insurance_coverage = ?19, copay_amount = ?20, dispensing_fee = ?21,
         notified_on_status_change = ?22, adherence_percentage = ?23, last_taken = ?24,
         next_due_date = ?25
         WHERE id = ?1",
        params![
            p.id.to_string(),
            p.rx_number,
            p.medication_name,
            p.dosage,
            p.instructions,
            p.prescribed_date.to_rfc3339(),
            p.expiry_date.to_rfc3339(),
            p.refills_remaining,
            p.status.as_str(),
            p.prescription_type.as_str(),
            p.for_user.to_string(),
            p.for_user_name,
            serde_json::to_string(&p.status_history)?,
            p.notes,
            p.pharmacist_message,
            serde_json::to_string(&p.messages)?,
            p.image_url,
            p.total_cost,
            p.insurance_coverage,
            p.copay_amount,
            p.dispensing_fee,
            p.notified_on_status_change as i32,
            p.adherence_percentage,
            p.last_taken.map(|d| d.to_rfc3339()),
            p.next_due_date.map(|d| d.to_rfc3339()),
        ],
    )?;

    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "prescription",
            id: p.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_prescription(conn: &Connection, id: &Uuid) -> Result<(), StorageError> {
    conn.execute(
        "DELETE FROM prescriptions WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

/// All prescriptions belonging to a patient or family member, newest first.
pub fn list_prescriptions_for_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<Prescription>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions WHERE for_user = ?1 ORDER BY prescribed_date DESC"
    ))?;
    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok(prescription_row_from_rusqlite(row))
    })?;
    collect_prescriptions(rows)
}

pub fn list_prescriptions_by_status(
    conn: &Connection,
    status: PrescriptionStatus,
) -> Result<Vec<Prescription>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions WHERE status = ?1 ORDER BY prescribed_date DESC"
    ))?;
    let rows = stmt.query_map(params![status.as_str()], |row| {
        Ok(prescription_row_from_rusqlite(row))
    })?;
    collect_prescriptions(rows)
}

/// Every prescription not yet completed.
pub fn list_active_prescriptions(conn: &Connection) -> Result<Vec<Prescription>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions WHERE status != 'Completed'
         ORDER BY prescribed_date DESC"
    ))?;
    let rows = stmt.query_map([], |row| Ok(prescription_row_from_rusqlite(row)))?;
    collect_prescriptions(rows)
}

/// Prescriptions carrying a pharmacist conversation, for the inbox view.
/// Matches either the chat thread or the legacy single-message field.
pub fn list_prescriptions_with_messages(
    conn: &Connection,
) -> Result<Vec<Prescription>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM prescriptions
         WHERE messages != '[]'
            OR (pharmacist_message IS NOT NULL AND pharmacist_message != '')
         ORDER BY prescribed_date DESC"
    ))?;
    let rows = stmt.query_map([], |row| Ok(prescription_row_from_rusqlite(row)))?;
    collect_prescriptions(rows)
}

fn collect_prescriptions(
    rows: impl Iterator<Item = Result<Result<PrescriptionRow, rusqlite::Error>, rusqlite::Error>>,
) -> Result<Vec<Prescription>, StorageError> {
    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(prescription_from_row(row??)?);
    }
    Ok(prescriptions)
}

// Internal row type for Prescription mapping
struct PrescriptionRow {
    id: String,
    rx_number: String,
    medication_name: String,
    dosage: String,
    instructions: String,
    prescribed_date: String,
    expiry_date: String,
    refills_remaining: u32,
    status: String,
    prescription_type: String,
    for_user: String,
    for_user_name: String,
    status_history: String,
    notes: Option<String>,
    pharmacist_message: Option<String>,
    messages: String,
    image_url: Option<String>,
    total_cost: Option<f64>,
    insurance_coverage: Option<f64>,
    copay_amount: Option<f64>,
    dispensing_fee: Option<f64>,
    notified_on_status_change: i32,
    adherence_percentage: f64,
    last_taken: Option<String>,
    next_due_date: Option<String>,
}

fn prescription_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        rx_number: row.get(1)?,
        medication_name: row.get(2)?,
        dosage: row.get(3)?,
        instructions: row.get(4)?,
        prescribed_date: row.get(5)?,
        expiry_date: row.get(6)?,
        refills_remaining: row.get(7)?,
        status: row.get(8)?,
        prescription_type: row.get(9)?,
        for_user: row.get(10)?,
        for_user_name: row.get(11)?,
        status_history: row.get(12)?,
        notes: row.get(13)?,
        pharmacist_message: row.get(14)?,
        messages: row.get(15)?,
        image_url: row.get(16)?,
        total_cost: row.get(17)?,
        insurance_coverage: row.get(18)?,
        copay_amount: row.get(19)?,
        dispensing_fee: row.get(20)?,
        notified_on_status_change: row.get(21)?,
        adherence_percentage: row.get(22)?,
        last_taken: row.get(23)?,
        next_due_date: row.get(24)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, StorageError> {
    Ok(Prescription {
        id: parse_uuid(&row.id, "id")?,
        rx_number: row.rx_number,
        medication_name: row.medication_name,
        dosage: row.dosage,
        instructions: row.instructions,
        prescribed_date: parse_timestamp(&row.prescribed_date, "prescribed_date")?,
        expiry_date: parse_timestamp(&row.expiry_date, "expiry_date")?,
        refills_remaining: row.refills_remaining,
        status: PrescriptionStatus::from_str(&row.status)?,
        prescription_type: PrescriptionType::from_str(&row.prescription_type)?,
        for_user: parse_uuid(&row.for_user, "for_user")?,
        for_user_name: row.for_user_name,
        status_history: serde_json::from_str(&row.status_history)?,
        notes: row.notes,
        pharmacist_message: row.pharmacist_message,
        messages: serde_json::from_str(&row.messages)?,
        image_url: row.image_url,
        total_cost: row.total_cost,
        insurance_coverage: row.insurance_coverage,
        copay_amount: row.copay_amount,
        dispensing_fee: row.dispensing_fee,
        notified_on_status_change: row.notified_on_status_change != 0,
        adherence_percentage: row.adherence_percentage,
        last_taken: parse_opt_timestamp(row.last_taken, "last_taken")?,
        next_due_date: parse_opt_timestamp(row.next_due_date, "next_due_date")?,
    })
}

//! Session log schema and operations

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{DoserError, Result};
use crate::models::{CalculatorInputs, CalculatorOutputs, SessionRecord};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per logged consumption session
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            device TEXT NOT NULL,
            method TEXT NOT NULL,
            dose_type TEXT NOT NULL,
            thc_percent REAL NOT NULL,
            cbd_percent REAL NOT NULL,
            desired_dose_mg REAL NOT NULL,
            higher_accuracy INTEGER NOT NULL,
            capsules_needed INTEGER NOT NULL,
            chambers_needed INTEGER NOT NULL,
            inhalations_needed INTEGER NOT NULL,
            notes TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_created ON sessions(created_at);
        "#,
    )?;
    Ok(())
}

/// Record a calculated session, returning its id
pub fn insert_session(
    conn: &Connection,
    inputs: &CalculatorInputs,
    outputs: &CalculatorOutputs,
    notes: Option<&str>,
) -> Result<i64> {
    let dose_type = inputs
        .desired_dose_type
        .ok_or_else(|| DoserError::InvalidInput(vec!["Select a dose type (THC or CBD)".to_string()]))?;

    conn.execute(
        "INSERT INTO sessions (device, method, dose_type, thc_percent, cbd_percent, desired_dose_mg,
                               higher_accuracy, capsules_needed, chambers_needed, inhalations_needed, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        (
            &inputs.device,
            inputs.method.as_str(),
            dose_type.as_str(),
            inputs.thc_percent,
            inputs.cbd_percent,
            inputs.desired_dose_mg,
            inputs.higher_accuracy,
            outputs.capsules_needed,
            outputs.chambers_needed,
            outputs.inhalations_needed,
            notes,
        ),
    )?;
    let id = conn.last_insert_rowid();
    debug!("logged session {}", id);
    Ok(id)
}

const SESSION_COLUMNS: &str = "id, created_at, device, method, dose_type, thc_percent, cbd_percent, desired_dose_mg,
     higher_accuracy, capsules_needed, chambers_needed, inhalations_needed, notes";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let method: String = row.get(3)?;
    let dose_type: String = row.get(4)?;

    Ok(SessionRecord {
        id: row.get(0)?,
        created_at: row.get(1)?,
        device: row.get(2)?,
        method: method.parse().map_err(|e: String| conversion_error(3, e))?,
        dose_type: dose_type.parse().map_err(|e: String| conversion_error(4, e))?,
        thc_percent: row.get(5)?,
        cbd_percent: row.get(6)?,
        desired_dose_mg: row.get(7)?,
        higher_accuracy: row.get(8)?,
        capsules_needed: row.get(9)?,
        chambers_needed: row.get(10)?,
        inhalations_needed: row.get(11)?,
        notes: row.get(12)?,
    })
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, message.into())
}

/// List logged sessions, newest first
pub fn list_sessions(conn: &Connection, limit: Option<usize>) -> Result<Vec<SessionRecord>> {
    let limit = limit.map_or(-1, |n| n as i64);
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sessions ORDER BY created_at DESC, id DESC LIMIT ?1",
        SESSION_COLUMNS
    ))?;

    let rows = stmt.query_map([limit], session_from_row)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Fetch one session by id
pub fn get_session(conn: &Connection, id: i64) -> Result<SessionRecord> {
    conn.query_row(
        &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
        [id],
        session_from_row,
    )
    .optional()?
    .ok_or(DoserError::SessionNotFound(id))
}

/// Remove one session
pub fn delete_session(conn: &Connection, id: i64) -> Result<()> {
    let removed = conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
    if removed == 0 {
        return Err(DoserError::SessionNotFound(id));
    }
    Ok(())
}

/// Clear the whole session log, returning how many rows were removed
pub fn clear_sessions(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM sessions", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_dosage_with;
    use crate::catalog::Catalog;
    use crate::models::{DoseType, MeasurementMethod};

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn inputs(dose_type: DoseType, dose: f64) -> CalculatorInputs {
        CalculatorInputs {
            device: "Arizer Solo 3".to_string(),
            method: MeasurementMethod::Capsule,
            chamber_weight_g: 0.0,
            thc_percent: 15.0,
            cbd_percent: 5.0,
            desired_dose_type: Some(dose_type),
            desired_dose_mg: dose,
            higher_accuracy: true,
            inhalations_per_unit: 6,
            total_session_inhalations: 6,
        }
    }

    fn log(conn: &Connection, dose_type: DoseType, dose: f64, notes: Option<&str>) -> i64 {
        let inputs = inputs(dose_type, dose);
        let outputs = calculate_dosage_with(&Catalog::builtin(), &inputs).unwrap();
        insert_session(conn, &inputs, &outputs, notes).unwrap()
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = open();
        init_schema(&conn).unwrap();
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open();
        let id = log(&conn, DoseType::Thc, 5.0, Some("evening"));

        let session = get_session(&conn, id).unwrap();
        assert_eq!(session.device, "Arizer Solo 3");
        assert_eq!(session.method, MeasurementMethod::Capsule);
        assert_eq!(session.dose_type, DoseType::Thc);
        assert!(session.higher_accuracy);
        assert_eq!(session.inhalations_needed, 2);
        assert_eq!(session.capsules_needed, 1);
        assert_eq!(session.notes.as_deref(), Some("evening"));
        assert!(!session.created_at.is_empty());
    }

    #[test]
    fn list_is_newest_first_and_limited() {
        let conn = open();
        let first = log(&conn, DoseType::Thc, 5.0, None);
        let second = log(&conn, DoseType::Cbd, 2.0, None);
        let third = log(&conn, DoseType::Thc, 7.5, None);

        let all = list_sessions(&conn, None).unwrap();
        let ids: Vec<i64> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![third, second, first]);

        let limited = list_sessions(&conn, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, third);
    }

    #[test]
    fn delete_and_missing_sessions() {
        let conn = open();
        let id = log(&conn, DoseType::Thc, 5.0, None);

        delete_session(&conn, id).unwrap();
        assert!(matches!(get_session(&conn, id), Err(DoserError::SessionNotFound(n)) if n == id));
        assert!(matches!(delete_session(&conn, id), Err(DoserError::SessionNotFound(_))));
    }

    #[test]
    fn clear_removes_everything() {
        let conn = open();
        log(&conn, DoseType::Thc, 5.0, None);
        log(&conn, DoseType::Cbd, 2.0, None);

        assert_eq!(clear_sessions(&conn).unwrap(), 2);
        assert!(list_sessions(&conn, None).unwrap().is_empty());
    }
}

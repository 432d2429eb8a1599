use crate::errors::AppResult;
use chrono::Local;
use rusqlite::Connection;
use rusqlite::params;
use tracing::warn;

/// Write an audit line into the `log` table.
pub fn ttlog(conn: &Connection, operation: &str, target: &str, message: &str) -> AppResult<()> {
    let now = Local::now().to_rfc3339();

    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now, operation, target, message])?;

    Ok(())
}

/// Audit after a mutation already succeeded on the ledger: a failure here
/// must not undo the mutation, so it is only traced.
pub fn audit(conn: &Connection, operation: &str, target: &str, message: &str) {
    if let Err(e) = ttlog(conn, operation, target, message) {
        warn!(operation, target, error = %e, "failed to write audit log");
    }
}

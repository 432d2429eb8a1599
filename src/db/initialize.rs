use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the ledger database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn, true)?;
    Ok(())
}

/// Same as [`init_db`] without progress output; used every time a ledger is
/// opened so that an older file picks up new migrations.
pub fn ensure_schema(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn, false)?;
    Ok(())
}

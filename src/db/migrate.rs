use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};
use tracing::debug;

/// A schema step, applied once and recorded in the `log` table as
/// `migration_applied` with its version as target.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20260901_0001_create_sessions",
        description: "Created sessions table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            date        TEXT NOT NULL,
            started_at  TEXT NOT NULL,
            closed_at   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_name_date ON sessions(name, date);
        "#,
    },
    Migration {
        version: "20260901_0002_create_regularizations",
        description: "Created regularizations table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS regularizations (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            date         TEXT NOT NULL,
            reason       TEXT NOT NULL CHECK(reason IN ('Forgot to Punch','College Event','Technical Error')),
            notes        TEXT NOT NULL,
            name         TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'Pending' CHECK(status IN ('Pending','Approved','Rejected')),
            created_at   TEXT NOT NULL,
            resolved_at  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_regularizations_name_date ON regularizations(name, date);
        "#,
    },
    Migration {
        version: "20261001_0003_one_open_session_per_name",
        description: "Enforced a single open session per student",
        sql: r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_open
            ON sessions(name) WHERE closed_at IS NULL;
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
pub fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration, verbose: bool) -> Result<()> {
    if is_applied(conn, m.version)? {
        debug!(version = m.version, "migration already applied");
        return Ok(());
    }

    conn.execute_batch(m.sql)?;

    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [m.version, m.description],
    )?;

    if verbose {
        success(format!("Migration applied: {} → {}", m.version, m.description));
    }

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection, verbose: bool) -> Result<()> {
    ensure_log_table(conn)?;

    for m in MIGRATIONS {
        apply(conn, m, verbose)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn, false).unwrap();
        run_pending_migrations(&conn, false).unwrap();

        let applied: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }
}

//! SQLite-backed implementation of the attendance [`Ledger`].

use crate::db::initialize::ensure_schema;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ledger::{Ledger, MonthSummary};
use crate::models::{
    AttendanceStatus, PendingRequest, RegularizationReason, RegularizationRequest, RequestId,
    RequestStatus, Resolution, SessionId, SessionInfo,
};
use crate::utils::date::all_days_of_month;
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeMap;
use tracing::debug;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

type Clock = Box<dyn Fn() -> NaiveDateTime>;

pub struct SqliteLedger {
    pool: DbPool,
    min_session_minutes: i64,
    clock: Clock,
}

impl SqliteLedger {
    /// Open (and migrate) the ledger stored at `path`.
    pub fn open(path: &str, min_session_minutes: u32) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        Self::from_pool(pool, min_session_minutes)
    }

    pub fn from_pool(pool: DbPool, min_session_minutes: u32) -> AppResult<Self> {
        ensure_schema(&pool.conn)?;
        Ok(Self {
            pool,
            min_session_minutes: i64::from(min_session_minutes),
            clock: Box::new(|| Local::now().naive_local()),
        })
    }

    /// Replace the wall clock (tests, `--today`).
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    /// Derived status of every day of `name` in `[from, to]` that has one.
    fn day_statuses(
        &self,
        name: &str,
        from: &str,
        to: &str,
    ) -> AppResult<BTreeMap<NaiveDate, AttendanceStatus>> {
        let mut out: BTreeMap<NaiveDate, AttendanceStatus> = BTreeMap::new();

        // 1) Sessions → Present / Shortage
        let mut stmt = self.pool.conn.prepare(
            "SELECT date, started_at, closed_at FROM sessions
             WHERE name = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC, started_at ASC",
        )?;
        let rows = stmt.query_map(params![name, from, to], |row| {
            let date = parse_date_col(row, 0)?;
            let started = parse_ts_col(row, 1)?;
            let closed: Option<String> = row.get(2)?;
            let closed = match closed {
                Some(raw) => Some(parse_ts(&raw, 2)?),
                None => None,
            };
            Ok((date, started, closed))
        })?;

        for r in rows {
            let (date, started, closed) = r?;
            let long_enough = match closed {
                None => true,
                Some(end) => (end - started).num_minutes() >= self.min_session_minutes,
            };

            let status = if long_enough {
                AttendanceStatus::Present
            } else {
                AttendanceStatus::Shortage
            };

            out.entry(date)
                .and_modify(|s| {
                    if status == AttendanceStatus::Present {
                        *s = AttendanceStatus::Present;
                    }
                })
                .or_insert(status);
        }

        // 2) Regularizations → Regularized / Pending Approval
        let mut stmt = self.pool.conn.prepare(
            "SELECT date, status FROM regularizations
             WHERE name = ?1 AND date BETWEEN ?2 AND ?3 AND status != 'Rejected'
             ORDER BY CASE status WHEN 'Approved' THEN 0 ELSE 1 END, id ASC",
        )?;
        let rows = stmt.query_map(params![name, from, to], |row| {
            let date = parse_date_col(row, 0)?;
            let status: String = row.get(1)?;
            Ok((date, status))
        })?;

        for r in rows {
            let (date, status) = r?;
            let current = out.get(&date).copied();

            match RequestStatus::from_db_str(&status) {
                Some(RequestStatus::Approved) if current != Some(AttendanceStatus::Present) => {
                    out.insert(date, AttendanceStatus::Regularized);
                }
                Some(RequestStatus::Pending)
                    if !matches!(
                        current,
                        Some(AttendanceStatus::Present) | Some(AttendanceStatus::Regularized)
                    ) =>
                {
                    out.insert(date, AttendanceStatus::PendingApproval);
                }
                _ => {}
            }
        }

        Ok(out)
    }

    fn load_session(&self, rowid: i64) -> AppResult<Option<SessionInfo>> {
        let info = self
            .pool
            .conn
            .query_row(
                "SELECT id, name, started_at, closed_at FROM sessions WHERE id = ?1",
                [rowid],
                map_session,
            )
            .optional()?;
        Ok(info)
    }
}

impl Ledger for SqliteLedger {
    fn attendance_count(&self, name: &str) -> AppResult<u32> {
        debug!(name, "attendance_count");
        let days = self.day_statuses(name, "0000-01-01", "9999-12-31")?;
        Ok(days.values().filter(|s| s.is_attended()).count() as u32)
    }

    fn month_summary(&self, name: &str, year: i32, month: u32) -> AppResult<MonthSummary> {
        debug!(name, year, month, "month_summary");
        let days = all_days_of_month(year, month);
        let (Some(first), Some(last)) = (days.first(), days.last()) else {
            return Err(AppError::InvalidDate(format!("{year}-{month:02}")));
        };

        let statuses = self.day_statuses(
            name,
            &first.format(DATE_FORMAT).to_string(),
            &last.format(DATE_FORMAT).to_string(),
        )?;

        Ok(statuses
            .into_iter()
            .map(|(d, s)| (d.format(DATE_FORMAT).to_string(), s.label().to_string()))
            .collect())
    }

    fn create_session(&self, name: &str) -> AppResult<SessionId> {
        debug!(name, "create_session");
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("A student name is required.".into()));
        }

        if let Some(open) = self.open_session_for(name)? {
            return Err(AppError::StateConflict(format!(
                "{} already has an open session ({}).",
                name, open.id
            )));
        }

        let now = self.now();
        self.pool.conn.execute(
            "INSERT INTO sessions (name, date, started_at) VALUES (?1, ?2, ?3)",
            params![
                name,
                now.date().format(DATE_FORMAT).to_string(),
                now.format(TS_FORMAT).to_string()
            ],
        )?;

        let id = session_id(self.pool.conn.last_insert_rowid());
        audit(
            &self.pool.conn,
            "punch_in",
            id.as_str(),
            &format!("{} punched in at {}", name, now.format(TS_FORMAT)),
        );
        Ok(id)
    }

    fn close_session(&self, id: &SessionId) -> AppResult<()> {
        debug!(id = %id, "close_session");
        let rowid = parse_session_id(id)
            .ok_or_else(|| AppError::StateConflict(format!("Unknown session id '{}'.", id)))?;

        let now = self.now();
        let changed = self.pool.conn.execute(
            "UPDATE sessions SET closed_at = ?1 WHERE id = ?2 AND closed_at IS NULL",
            params![now.format(TS_FORMAT).to_string(), rowid],
        )?;

        if changed == 0 {
            return Err(AppError::StateConflict(format!(
                "Session {} is not open on the ledger.",
                id
            )));
        }

        audit(
            &self.pool.conn,
            "punch_out",
            id.as_str(),
            &format!("session closed at {}", now.format(TS_FORMAT)),
        );
        Ok(())
    }

    fn session(&self, id: &SessionId) -> AppResult<Option<SessionInfo>> {
        match parse_session_id(id) {
            Some(rowid) => self.load_session(rowid),
            None => Ok(None),
        }
    }

    fn open_session_for(&self, name: &str) -> AppResult<Option<SessionInfo>> {
        let info = self
            .pool
            .conn
            .query_row(
                "SELECT id, name, started_at, closed_at FROM sessions
                 WHERE name = ?1 AND closed_at IS NULL
                 ORDER BY id DESC LIMIT 1",
                [name.trim()],
                map_session,
            )
            .optional()?;
        Ok(info)
    }

    fn create_regularization_request(
        &self,
        request: &RegularizationRequest,
    ) -> AppResult<RequestId> {
        debug!(date = %request.date, name = %request.submitted_by, "create_regularization_request");

        if request.submitted_by.trim().is_empty() || request.notes.trim().is_empty() {
            return Err(AppError::Validation(
                "Name and notes are required for a regularization request.".into(),
            ));
        }

        if request.date > self.now().date() {
            return Err(AppError::Validation(format!(
                "Cannot regularize a future date ({}).",
                request.date
            )));
        }

        let date_str = request.date.format(DATE_FORMAT).to_string();
        let already_pending: Option<i64> = self
            .pool
            .conn
            .query_row(
                "SELECT id FROM regularizations
                 WHERE name = ?1 AND date = ?2 AND status = 'Pending'
                 LIMIT 1",
                params![request.submitted_by.trim(), date_str],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing) = already_pending {
            return Err(AppError::StateConflict(format!(
                "A request for {} is already pending (#{}).",
                date_str, existing
            )));
        }

        self.pool.conn.execute(
            "INSERT INTO regularizations (date, reason, notes, name, status, created_at)
             VALUES (?1, ?2, ?3, ?4, 'Pending', ?5)",
            params![
                date_str,
                request.reason.to_db_str(),
                request.notes.trim(),
                request.submitted_by.trim(),
                self.now().format(TS_FORMAT).to_string(),
            ],
        )?;

        let id = self.pool.conn.last_insert_rowid();
        audit(
            &self.pool.conn,
            "regularize",
            &format!("#{id}"),
            &format!(
                "{} requested {} ({})",
                request.submitted_by.trim(),
                date_str,
                request.reason
            ),
        );
        Ok(id)
    }

    fn list_pending_requests(&self) -> AppResult<Vec<PendingRequest>> {
        let mut stmt = self.pool.conn.prepare(
            "SELECT id, name, notes, date, reason FROM regularizations
             WHERE status = 'Pending'
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], map_pending)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn resolve_request(&self, id: RequestId, resolution: Resolution) -> AppResult<()> {
        debug!(id, resolution = resolution.as_str(), "resolve_request");
        let changed = self.pool.conn.execute(
            "UPDATE regularizations SET status = ?1, resolved_at = ?2
             WHERE id = ?3 AND status = 'Pending'",
            params![
                resolution.as_str(),
                self.now().format(TS_FORMAT).to_string(),
                id
            ],
        )?;

        if changed == 0 {
            return Err(AppError::StateConflict(format!(
                "Request #{} does not exist or is already resolved.",
                id
            )));
        }

        let op = match resolution {
            Resolution::Approved => "approve",
            Resolution::Rejected => "reject",
        };
        audit(&self.pool.conn, op, &format!("#{id}"), resolution.as_str());
        Ok(())
    }
}

fn session_id(rowid: i64) -> SessionId {
    SessionId::new(format!("r{rowid}"))
}

fn parse_session_id(id: &SessionId) -> Option<i64> {
    id.as_str().strip_prefix('r')?.parse().ok()
}

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_ts(raw: &str, col: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .map_err(|_| conversion_error(col, AppError::InvalidDate(raw.to_string())))
}

fn parse_ts_col(row: &Row, col: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(col)?;
    parse_ts(&raw, col)
}

fn parse_date_col(row: &Row, col: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|_| conversion_error(col, AppError::InvalidDate(raw.clone())))
}

fn map_session(row: &Row) -> rusqlite::Result<SessionInfo> {
    let closed: Option<String> = row.get(3)?;
    Ok(SessionInfo {
        id: session_id(row.get(0)?),
        name: row.get(1)?,
        started_at: parse_ts_col(row, 2)?,
        closed_at: match closed {
            Some(raw) => Some(parse_ts(&raw, 3)?),
            None => None,
        },
    })
}

fn map_pending(row: &Row) -> rusqlite::Result<PendingRequest> {
    let reason_str: String = row.get(4)?;
    let reason = RegularizationReason::from_db_str(&reason_str)
        .ok_or_else(|| conversion_error(4, AppError::InvalidReason(reason_str.clone())))?;

    Ok(PendingRequest {
        id: row.get(0)?,
        student_name: row.get(1)?,
        notes: row.get(2)?,
        date: parse_date_col(row, 3)?,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    /// Ledger whose clock can be moved by the test.
    fn ledger(min_minutes: u32) -> (SqliteLedger, Rc<Cell<NaiveDateTime>>) {
        let now = Rc::new(Cell::new(at(2026, 10, 1, 9, 0)));
        let clock = Rc::clone(&now);
        let ledger = SqliteLedger::from_pool(DbPool::in_memory().unwrap(), min_minutes)
            .unwrap()
            .with_clock(move || clock.get());
        (ledger, now)
    }

    fn request(date: NaiveDate, name: &str) -> RegularizationRequest {
        RegularizationRequest {
            date,
            reason: RegularizationReason::ForgotToPunch,
            notes: "left my phone at home".into(),
            submitted_by: name.into(),
        }
    }

    #[test]
    fn first_session_id_is_r1() {
        let (l, _) = ledger(0);
        let id = l.create_session("Asha").unwrap();
        assert_eq!(id.as_str(), "r1");
        assert!(l.session(&id).unwrap().unwrap().is_open());
    }

    #[test]
    fn second_open_session_for_same_name_is_a_conflict() {
        let (l, _) = ledger(0);
        l.create_session("Asha").unwrap();
        let err = l.create_session("Asha").unwrap_err();
        assert!(err.is_state_conflict());
        // another student is unaffected
        assert!(l.create_session("Ravi").is_ok());
    }

    #[test]
    fn closing_twice_is_a_conflict() {
        let (l, _) = ledger(0);
        let id = l.create_session("Asha").unwrap();
        l.close_session(&id).unwrap();
        assert!(l.close_session(&id).unwrap_err().is_state_conflict());
        assert!(
            l.close_session(&SessionId::new("bogus"))
                .unwrap_err()
                .is_state_conflict()
        );
    }

    #[test]
    fn summary_marks_present_and_shortage_days() {
        let (l, now) = ledger(45);

        // Oct 1: 09:00 → 10:00 = 60 min → Present
        let id = l.create_session("Asha").unwrap();
        now.set(at(2026, 10, 1, 10, 0));
        l.close_session(&id).unwrap();

        // Oct 2: 09:00 → 09:20 = 20 min → Shortage
        now.set(at(2026, 10, 2, 9, 0));
        let id = l.create_session("Asha").unwrap();
        now.set(at(2026, 10, 2, 9, 20));
        l.close_session(&id).unwrap();

        let summary = l.month_summary("Asha", 2026, 10).unwrap();
        assert_eq!(summary.get("2026-10-01").map(String::as_str), Some("Present"));
        assert_eq!(summary.get("2026-10-02").map(String::as_str), Some("Shortage"));
        assert_eq!(summary.len(), 2);

        assert_eq!(l.attendance_count("Asha").unwrap(), 1);
        assert!(l.month_summary("Ravi", 2026, 10).unwrap().is_empty());
    }

    #[test]
    fn regularization_lifecycle_reaches_the_summary() {
        let (l, now) = ledger(0);
        now.set(at(2026, 10, 10, 12, 0));
        let day = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();

        let id = l.create_regularization_request(&request(day, "Asha")).unwrap();
        let summary = l.month_summary("Asha", 2026, 10).unwrap();
        assert_eq!(
            summary.get("2026-10-05").map(String::as_str),
            Some("Pending Approval")
        );

        let pending = l.list_pending_requests().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].student_name, "Asha");
        assert_eq!(pending[0].date, day);

        l.resolve_request(id, Resolution::Approved).unwrap();
        let summary = l.month_summary("Asha", 2026, 10).unwrap();
        assert_eq!(
            summary.get("2026-10-05").map(String::as_str),
            Some("Regularized")
        );
        assert_eq!(l.attendance_count("Asha").unwrap(), 1);
        assert!(l.list_pending_requests().unwrap().is_empty());

        assert!(
            l.resolve_request(id, Resolution::Rejected)
                .unwrap_err()
                .is_state_conflict()
        );
    }

    #[test]
    fn rejected_request_leaves_the_day_absent() {
        let (l, now) = ledger(0);
        now.set(at(2026, 10, 10, 12, 0));
        let day = NaiveDate::from_ymd_opt(2026, 10, 6).unwrap();

        let id = l.create_regularization_request(&request(day, "Asha")).unwrap();
        l.resolve_request(id, Resolution::Rejected).unwrap();

        assert!(l.month_summary("Asha", 2026, 10).unwrap().is_empty());
        assert_eq!(l.attendance_count("Asha").unwrap(), 0);
    }

    #[test]
    fn duplicate_and_future_requests_are_refused() {
        let (l, now) = ledger(0);
        now.set(at(2026, 10, 10, 12, 0));
        let day = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();

        l.create_regularization_request(&request(day, "Asha")).unwrap();
        assert!(
            l.create_regularization_request(&request(day, "Asha"))
                .unwrap_err()
                .is_state_conflict()
        );

        let future = NaiveDate::from_ymd_opt(2026, 10, 11).unwrap();
        assert!(
            l.create_regularization_request(&request(future, "Asha"))
                .unwrap_err()
                .is_validation()
        );
    }

    #[test]
    fn mutations_are_audited() {
        let (l, _) = ledger(0);
        let id = l.create_session("Asha").unwrap();
        l.close_session(&id).unwrap();

        let ops: Vec<String> = l
            .conn()
            .prepare("SELECT operation FROM log WHERE operation LIKE 'punch_%' ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(ops, vec!["punch_in", "punch_out"]);
    }
}

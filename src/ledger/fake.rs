//! In-memory ledger for unit tests: records every call and can be switched
//! offline to simulate transport failures.

use super::{Ledger, MonthSummary};
use crate::errors::{AppError, AppResult};
use crate::models::{
    PendingRequest, RegularizationRequest, RequestId, RequestStatus, Resolution, SessionId,
    SessionInfo,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};

#[derive(Default)]
pub struct FakeLedger {
    pub offline: Cell<bool>,
    pub count: Cell<u32>,
    pub summary: RefCell<MonthSummary>,
    calls: RefCell<Vec<&'static str>>,
    sessions: RefCell<Vec<SessionInfo>>,
    requests: RefCell<Vec<(RequestId, RegularizationRequest, RequestStatus)>>,
}

fn started() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid timestamp")
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == op).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.borrow().iter().filter(|s| s.is_open()).count()
    }

    /// Open a session behind the client's back.
    pub fn seed_open_session(&self, name: &str) -> SessionId {
        let id = SessionId::new(format!("r{}", self.sessions.borrow().len() + 1));
        self.sessions.borrow_mut().push(SessionInfo {
            id: id.clone(),
            name: name.to_string(),
            started_at: started(),
            closed_at: None,
        });
        id
    }

    fn record(&self, op: &'static str) -> AppResult<()> {
        self.calls.borrow_mut().push(op);
        if self.offline.get() {
            return Err(AppError::Transport(format!("{op}: ledger offline")));
        }
        Ok(())
    }
}

impl Ledger for FakeLedger {
    fn attendance_count(&self, _name: &str) -> AppResult<u32> {
        self.record("attendance_count")?;
        Ok(self.count.get())
    }

    fn month_summary(&self, _name: &str, _year: i32, _month: u32) -> AppResult<MonthSummary> {
        self.record("month_summary")?;
        Ok(self.summary.borrow().clone())
    }

    fn create_session(&self, name: &str) -> AppResult<SessionId> {
        self.record("create_session")?;
        let open = self
            .sessions
            .borrow()
            .iter()
            .find(|s| s.name == name && s.is_open())
            .map(|s| s.id.clone());
        if let Some(id) = open {
            return Err(AppError::StateConflict(format!(
                "{name} already has an open session ({id})"
            )));
        }
        Ok(self.seed_open_session(name))
    }

    fn close_session(&self, id: &SessionId) -> AppResult<()> {
        self.record("close_session")?;
        let mut sessions = self.sessions.borrow_mut();
        match sessions.iter_mut().find(|s| &s.id == id && s.is_open()) {
            Some(s) => {
                s.closed_at = Some(started());
                Ok(())
            }
            None => Err(AppError::StateConflict(format!("no open session {id}"))),
        }
    }

    fn session(&self, id: &SessionId) -> AppResult<Option<SessionInfo>> {
        self.record("session")?;
        Ok(self.sessions.borrow().iter().find(|s| &s.id == id).cloned())
    }

    fn open_session_for(&self, name: &str) -> AppResult<Option<SessionInfo>> {
        self.record("open_session_for")?;
        Ok(self
            .sessions
            .borrow()
            .iter()
            .find(|s| s.name == name && s.is_open())
            .cloned())
    }

    fn create_regularization_request(
        &self,
        request: &RegularizationRequest,
    ) -> AppResult<RequestId> {
        self.record("create_regularization_request")?;
        let mut requests = self.requests.borrow_mut();
        let id = requests.len() as RequestId + 1;
        requests.push((id, request.clone(), RequestStatus::Pending));
        Ok(id)
    }

    fn list_pending_requests(&self) -> AppResult<Vec<PendingRequest>> {
        self.record("list_pending_requests")?;
        Ok(self
            .requests
            .borrow()
            .iter()
            .filter(|(_, _, st)| *st == RequestStatus::Pending)
            .map(|(id, r, _)| PendingRequest {
                id: *id,
                student_name: r.submitted_by.clone(),
                notes: r.notes.clone(),
                date: r.date,
                reason: r.reason,
            })
            .collect())
    }

    fn resolve_request(&self, id: RequestId, resolution: Resolution) -> AppResult<()> {
        self.record("resolve_request")?;
        let mut requests = self.requests.borrow_mut();
        match requests
            .iter_mut()
            .find(|(rid, _, st)| *rid == id && *st == RequestStatus::Pending)
        {
            Some(entry) => {
                entry.2 = resolution.status();
                Ok(())
            }
            None => Err(AppError::StateConflict(format!(
                "request {id} is not pending"
            ))),
        }
    }
}

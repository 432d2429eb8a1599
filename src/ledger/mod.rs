//! Contract of the remote attendance ledger.
//!
//! The core never talks to a concrete backend: sessions, month summaries and
//! regularization requests all go through [`Ledger`]. The shipped backend is
//! [`crate::db::ledger::SqliteLedger`].

use crate::errors::AppResult;
use crate::models::{
    PendingRequest, RegularizationRequest, RequestId, Resolution, SessionId, SessionInfo,
};
use std::collections::BTreeMap;

/// Month summary as the ledger ships it: ISO date → raw status string.
pub type MonthSummary = BTreeMap<String, String>;

pub trait Ledger {
    /// Number of attended days of `name`.
    fn attendance_count(&self, name: &str) -> AppResult<u32>;

    /// Raw status of every day of the month that has one.
    fn month_summary(&self, name: &str, year: i32, month: u32) -> AppResult<MonthSummary>;

    /// Open a session. Not idempotent: callers must not race two of these.
    fn create_session(&self, name: &str) -> AppResult<SessionId>;

    /// Close an open session. Unknown or already closed ids are a
    /// `StateConflict`.
    fn close_session(&self, id: &SessionId) -> AppResult<()>;

    fn session(&self, id: &SessionId) -> AppResult<Option<SessionInfo>>;

    /// The open session of `name`, if any.
    fn open_session_for(&self, name: &str) -> AppResult<Option<SessionInfo>>;

    fn create_regularization_request(&self, request: &RegularizationRequest)
    -> AppResult<RequestId>;

    fn list_pending_requests(&self) -> AppResult<Vec<PendingRequest>>;

    /// Approver only. Resolving a request twice is a `StateConflict`.
    fn resolve_request(&self, id: RequestId, resolution: Resolution) -> AppResult<()>;
}

impl<L: Ledger + ?Sized> Ledger for &L {
    fn attendance_count(&self, name: &str) -> AppResult<u32> {
        (**self).attendance_count(name)
    }

    fn month_summary(&self, name: &str, year: i32, month: u32) -> AppResult<MonthSummary> {
        (**self).month_summary(name, year, month)
    }

    fn create_session(&self, name: &str) -> AppResult<SessionId> {
        (**self).create_session(name)
    }

    fn close_session(&self, id: &SessionId) -> AppResult<()> {
        (**self).close_session(id)
    }

    fn session(&self, id: &SessionId) -> AppResult<Option<SessionInfo>> {
        (**self).session(id)
    }

    fn open_session_for(&self, name: &str) -> AppResult<Option<SessionInfo>> {
        (**self).open_session_for(name)
    }

    fn create_regularization_request(
        &self,
        request: &RegularizationRequest,
    ) -> AppResult<RequestId> {
        (**self).create_regularization_request(request)
    }

    fn list_pending_requests(&self) -> AppResult<Vec<PendingRequest>> {
        (**self).list_pending_requests()
    }

    fn resolve_request(&self, id: RequestId, resolution: Resolution) -> AppResult<()> {
        (**self).resolve_request(id, resolution)
    }
}

#[cfg(test)]
pub mod fake;

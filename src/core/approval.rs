use crate::errors::AppResult;
use crate::ledger::Ledger;
use crate::models::{PendingRequest, RequestId, Resolution};
use tracing::info;

/// Approver-side handling of regularization requests.
pub struct ApprovalDesk<L: Ledger> {
    ledger: L,
}

impl<L: Ledger> ApprovalDesk<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Unresolved requests, oldest first.
    pub fn pending(&self) -> AppResult<Vec<PendingRequest>> {
        let mut requests = self.ledger.list_pending_requests()?;
        requests.sort_by_key(|r| r.id);
        Ok(requests)
    }

    pub fn approve(&self, id: RequestId) -> AppResult<()> {
        self.resolve(id, Resolution::Approved)
    }

    pub fn reject(&self, id: RequestId) -> AppResult<()> {
        self.resolve(id, Resolution::Rejected)
    }

    fn resolve(&self, id: RequestId, resolution: Resolution) -> AppResult<()> {
        self.ledger.resolve_request(id, resolution)?;
        info!(request = id, resolution = resolution.as_str(), "request resolved");
        Ok(())
    }
}

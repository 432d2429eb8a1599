use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session identifier handed out by the ledger (`record_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The session the current user is punched into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    /// `None` when the session was recovered from local state only.
    pub started_at: Option<NaiveDateTime>,
}

/// Ledger-side view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: SessionId,
    pub name: String,
    pub started_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
}

impl SessionInfo {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    pub fn into_session(self) -> Session {
        Session {
            id: self.id,
            started_at: Some(self.started_at),
        }
    }
}

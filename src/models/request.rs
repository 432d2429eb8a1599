use super::reason::RegularizationReason;
use chrono::NaiveDate;
use serde::Serialize;

pub type RequestId = i64;

/// A correction request as submitted by a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegularizationRequest {
    pub date: NaiveDate,
    pub reason: RegularizationReason,
    pub notes: String,
    pub submitted_by: String,
}

/// Lifecycle of a request. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(RequestStatus::Pending),
            "Approved" => Some(RequestStatus::Approved),
            "Rejected" => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

/// Outcome chosen by the approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Approved,
    Rejected,
}

impl Resolution {
    pub fn status(&self) -> RequestStatus {
        match self {
            Resolution::Approved => RequestStatus::Approved,
            Resolution::Rejected => RequestStatus::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.status().to_db_str()
    }
}

/// An unresolved request as listed for the approver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRequest {
    pub id: RequestId,
    pub student_name: String,
    pub notes: String,
    pub date: NaiveDate,
    pub reason: RegularizationReason,
}

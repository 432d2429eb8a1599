use serde::Serialize;
use tracing::warn;

/// Presentation category of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    PendingApproval,
    Regularized,
    Shortage,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::PendingApproval,
        AttendanceStatus::Regularized,
        AttendanceStatus::Shortage,
    ];

    /// Human label, spelled the way the ledger spells it.
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::PendingApproval => "Pending Approval",
            AttendanceStatus::Regularized => "Regularized",
            AttendanceStatus::Shortage => "Shortage",
        }
    }

    /// CSS-safe token (`pending-approval`).
    pub fn css_token(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::PendingApproval => "pending-approval",
            AttendanceStatus::Regularized => "regularized",
            AttendanceStatus::Shortage => "shortage",
        }
    }

    /// Single-character marker used by the calendar grid.
    pub fn marker(&self) -> char {
        match self {
            AttendanceStatus::Present => 'P',
            AttendanceStatus::Absent => 'A',
            AttendanceStatus::PendingApproval => '?',
            AttendanceStatus::Regularized => 'R',
            AttendanceStatus::Shortage => 'S',
        }
    }

    /// Strict parse of a ledger status string.
    ///
    /// Case, spaces, dashes and underscores are ignored, so
    /// `"Pending Approval"`, `"pending-approval"` and `"PENDING_APPROVAL"`
    /// are the same status.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "pendingapproval" | "pending" => Some(AttendanceStatus::PendingApproval),
            "regularized" | "regularised" => Some(AttendanceStatus::Regularized),
            "shortage" => Some(AttendanceStatus::Shortage),
            _ => None,
        }
    }

    /// Lenient parse used at the ledger boundary: unknown strings fall back
    /// to `Absent`.
    pub fn normalize(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            warn!(status = raw, "unknown attendance status, treating as Absent");
            AttendanceStatus::Absent
        })
    }

    /// Days that count towards the attended total.
    pub fn is_attended(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Regularized
        )
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

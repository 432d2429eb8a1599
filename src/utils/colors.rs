/// ANSI color helper utilities for terminal output.
use crate::models::AttendanceStatus;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";

/// Calendar tile color for a day status.
/// Future days (`None`) are greyed out.
pub fn color_for_status(status: Option<AttendanceStatus>) -> &'static str {
    match status {
        Some(AttendanceStatus::Present) => GREEN,
        Some(AttendanceStatus::Absent) => RED,
        Some(AttendanceStatus::PendingApproval) => YELLOW,
        Some(AttendanceStatus::Regularized) => BLUE,
        Some(AttendanceStatus::Shortage) => MAGENTA,
        None => GREY,
    }
}

/// Eligibility color:
/// eligible → green
/// otherwise → red
pub fn color_for_eligibility(is_eligible: bool) -> &'static str {
    if is_eligible { GREEN } else { RED }
}

pub fn paint(value: &str, color: &str) -> String {
    format!("{color}{value}{RESET}")
}

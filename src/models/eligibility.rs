use serde::Serialize;

/// Attendance percentage against the target, recomputed on every count change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EligibilitySnapshot {
    pub attended_count: u32,
    pub total_target: u32,
    pub percentage: f64,
    pub classes_needed: u32,
    pub is_eligible: bool,
}

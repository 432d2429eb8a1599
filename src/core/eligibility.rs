//! Attendance eligibility against the required 75 % threshold.

use crate::errors::{AppError, AppResult};
use crate::models::EligibilitySnapshot;

/// Required share of attended classes, in percent.
pub const THRESHOLD_PERCENT: u32 = 75;

/// Program-defined number of classes in the term.
pub const DEFAULT_TOTAL_CLASSES: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityCalculator {
    total_target: u32,
}

impl Default for EligibilityCalculator {
    fn default() -> Self {
        Self {
            total_target: DEFAULT_TOTAL_CLASSES,
        }
    }
}

impl EligibilityCalculator {
    pub fn new(total_target: u32) -> AppResult<Self> {
        if total_target == 0 {
            return Err(AppError::Config(
                "total_classes must be greater than zero".into(),
            ));
        }
        Ok(Self { total_target })
    }

    pub fn total_target(&self) -> u32 {
        self.total_target
    }

    pub fn compute(&self, attended_count: u32) -> EligibilitySnapshot {
        compute(attended_count, self.total_target)
    }
}

/// Pure eligibility computation.
///
/// `classes_needed` and `is_eligible` use integer arithmetic so that the
/// threshold comparison is exact; `total_target` must be non-zero.
pub fn compute(attended_count: u32, total_target: u32) -> EligibilitySnapshot {
    let attended = u64::from(attended_count);
    let total = u64::from(total_target);
    let threshold = u64::from(THRESHOLD_PERCENT);

    // ceil(threshold% × total)
    let required = (threshold * total).div_ceil(100);
    let classes_needed = required.saturating_sub(attended) as u32;

    let percentage = if total_target == 0 {
        0.0
    } else {
        100.0 * f64::from(attended_count) / f64::from(total_target)
    };

    EligibilitySnapshot {
        attended_count,
        total_target,
        percentage,
        classes_needed,
        is_eligible: total_target > 0 && attended * 100 >= threshold * total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_eight_of_fifty_is_eligible() {
        let s = compute(38, 50);
        assert_eq!(s.percentage, 76.0);
        assert!(s.is_eligible);
        assert_eq!(s.classes_needed, 0);
    }

    #[test]
    fn thirty_of_fifty_needs_eight_more() {
        let s = compute(30, 50);
        assert_eq!(s.percentage, 60.0);
        assert!(!s.is_eligible);
        assert_eq!(s.classes_needed, 8);
    }

    #[test]
    fn exactly_on_threshold_is_eligible() {
        let s = compute(3, 4);
        assert_eq!(s.percentage, 75.0);
        assert!(s.is_eligible);
        assert_eq!(s.classes_needed, 0);
    }

    #[test]
    fn formula_holds_for_every_count_up_to_target() {
        for total in [1u32, 4, 30, 50, 73] {
            for attended in 0..=total {
                let s = compute(attended, total);
                let expected_needed =
                    (0.75 * f64::from(total) - f64::from(attended)).ceil().max(0.0) as u32;
                assert_eq!(s.classes_needed, expected_needed, "{attended}/{total}");
                assert_eq!(
                    s.is_eligible,
                    f64::from(attended) / f64::from(total) >= 0.75,
                    "{attended}/{total}"
                );
                assert_eq!(s.is_eligible, s.percentage >= 75.0);
            }
        }
    }

    #[test]
    fn zero_target_is_rejected() {
        assert!(EligibilityCalculator::new(0).is_err());
        assert_eq!(EligibilityCalculator::default().total_target(), 50);
    }
}

//! Last good month view and eligibility, with refresh ordering.

use crate::core::eligibility::EligibilityCalculator;
use crate::errors::AppError;
use crate::models::{EligibilitySnapshot, MonthView};
use tracing::{debug, error};

/// Taken when a refresh starts; remembers which mutations it can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
}

pub struct ViewState {
    calculator: EligibilityCalculator,
    month: Option<MonthView>,
    eligibility: EligibilitySnapshot,
    /// Bumped after every completed mutation.
    mutation_seq: u64,
    /// Sequence seen by the last applied refresh.
    applied_seq: u64,
}

impl ViewState {
    pub fn new(calculator: EligibilityCalculator) -> Self {
        Self {
            calculator,
            month: None,
            eligibility: calculator.compute(0),
            mutation_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn month(&self) -> Option<&MonthView> {
        self.month.as_ref()
    }

    pub fn eligibility(&self) -> &EligibilitySnapshot {
        &self.eligibility
    }

    pub fn calculator(&self) -> &EligibilityCalculator {
        &self.calculator
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        RefreshTicket {
            seq: self.mutation_seq,
        }
    }

    /// A ledger mutation finished; refreshes started before now are stale.
    pub fn mutation_completed(&mut self) {
        self.mutation_seq += 1;
    }

    /// Install refreshed data unless a mutation completed after `ticket`
    /// was taken, or a newer refresh was already applied.
    ///
    /// Returns whether the data was applied.
    pub fn apply(&mut self, ticket: RefreshTicket, month: MonthView, attended: u32) -> bool {
        if ticket.seq < self.mutation_seq || ticket.seq < self.applied_seq {
            debug!(
                ticket = ticket.seq,
                current = self.mutation_seq,
                "discarding stale refresh"
            );
            return false;
        }

        self.month = Some(month);
        self.eligibility = self.calculator.compute(attended);
        self.applied_seq = ticket.seq;
        true
    }

    /// Background refresh failed: the previous view stays.
    pub fn refresh_failed(&self, err: &AppError) {
        error!(error = %err, "refresh failed, keeping the previous view");
    }

    /// Drop everything derived (sign-out).
    pub fn clear(&mut self) {
        self.month = None;
        self.eligibility = self.calculator.compute(0);
        self.mutation_completed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CalendarReconciler;
    use crate::ledger::MonthSummary;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn month(day: u32) -> MonthView {
        CalendarReconciler::reconcile(
            2026,
            10,
            NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            &MonthSummary::new(),
            &BTreeSet::new(),
        )
        .unwrap()
    }

    #[test]
    fn fresh_refresh_is_applied_and_recomputes_eligibility() {
        let mut vs = ViewState::new(EligibilityCalculator::default());
        let t = vs.begin_refresh();
        assert!(vs.apply(t, month(16), 38));
        assert_eq!(vs.eligibility().percentage, 76.0);
        assert!(vs.eligibility().is_eligible);

        let t = vs.begin_refresh();
        assert!(vs.apply(t, month(16), 30));
        assert_eq!(vs.eligibility().classes_needed, 8);
    }

    #[test]
    fn refresh_started_before_a_mutation_is_discarded() {
        let mut vs = ViewState::new(EligibilityCalculator::default());
        let before = vs.begin_refresh();
        vs.mutation_completed();
        let after = vs.begin_refresh();

        assert!(vs.apply(after, month(16), 5));
        assert!(!vs.apply(before, month(1), 1));
        assert_eq!(vs.eligibility().attended_count, 5);
        assert_eq!(vs.month().map(|m| m.rows().len()), Some(16));
    }

    #[test]
    fn failed_refresh_keeps_previous_view() {
        let mut vs = ViewState::new(EligibilityCalculator::default());
        let t = vs.begin_refresh();
        vs.apply(t, month(16), 10);

        vs.refresh_failed(&AppError::Transport("down".into()));
        assert_eq!(vs.eligibility().attended_count, 10);
        assert!(vs.month().is_some());
    }

    #[test]
    fn clear_resets_derived_values() {
        let mut vs = ViewState::new(EligibilityCalculator::default());
        let t = vs.begin_refresh();
        vs.apply(t, month(16), 10);
        vs.clear();
        assert!(vs.month().is_none());
        assert_eq!(vs.eligibility().attended_count, 0);
        assert!(!vs.apply(t, month(16), 10));
    }
}

//! One user's screen: tracker, request form and the derived views.

use crate::core::calendar::{CalendarReconciler, pending_dates_for};
use crate::core::eligibility::EligibilityCalculator;
use crate::core::regularize::RegularizationWorkflow;
use crate::core::tracker::SessionTracker;
use crate::core::view::ViewState;
use crate::errors::{AppError, AppResult};
use crate::ledger::{Ledger, MonthSummary};
use crate::models::{
    EligibilitySnapshot, MonthView, RegularizationReason, RequestId, SessionId,
};
use crate::state::StateStore;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Where the dashboard reads "today" from, on every refresh.
pub enum Today {
    /// Local calendar date.
    Live,
    /// Pinned date (`--today`).
    Fixed(NaiveDate),
    /// Any other source.
    Source(Box<dyn Fn() -> NaiveDate>),
}

impl Today {
    pub fn date(&self) -> NaiveDate {
        match self {
            Today::Live => crate::utils::date::today(),
            Today::Fixed(day) => *day,
            Today::Source(source) => source(),
        }
    }
}

impl From<NaiveDate> for Today {
    fn from(day: NaiveDate) -> Self {
        Today::Fixed(day)
    }
}

/// Result of the single punch button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Punch {
    In(SessionId),
    Out(SessionId),
}

pub struct Dashboard<L: Ledger, S: StateStore> {
    ledger: L,
    tracker: SessionTracker<S>,
    workflow: RegularizationWorkflow,
    view: ViewState,
    clock: Today,
    today: NaiveDate,
    shown: (i32, u32),
}

impl<L: Ledger, S: StateStore> Dashboard<L, S> {
    /// Restore the tracker and load the current month.
    ///
    /// A failed first load leaves an empty view; the error is logged.
    pub fn open(
        ledger: L,
        store: S,
        calculator: EligibilityCalculator,
        clock: impl Into<Today>,
    ) -> Self {
        let clock = clock.into();
        let today = clock.date();
        let tracker = SessionTracker::restore(&ledger, store);
        let mut dashboard = Self {
            ledger,
            tracker,
            workflow: RegularizationWorkflow::new(),
            view: ViewState::new(calculator),
            clock,
            today,
            shown: (today.year(), today.month()),
        };
        dashboard.refresh_in_background();
        dashboard
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn tracker(&self) -> &SessionTracker<S> {
        &self.tracker
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn shown_month(&self) -> (i32, u32) {
        self.shown
    }

    pub fn month(&self) -> Option<&MonthView> {
        self.view.month()
    }

    pub fn eligibility(&self) -> &EligibilitySnapshot {
        self.view.eligibility()
    }

    /// Re-read the date. The current month follows a day change; a browsed
    /// month stays put. Returns whether the date moved.
    fn roll_day(&mut self) -> bool {
        let today = self.clock.date();
        if today == self.today {
            return false;
        }

        info!(from = %self.today, to = %today, "date changed");
        if self.shown == (self.today.year(), self.today.month()) {
            self.shown = (today.year(), today.month());
        }
        self.today = today;
        true
    }

    /// Re-derive month view and eligibility from the ledger.
    pub fn refresh(&mut self) -> AppResult<()> {
        self.roll_day();
        let ticket = self.view.begin_refresh();
        let (year, month) = self.shown;

        let Some(name) = self.tracker.display_name() else {
            debug!("no display name yet, showing an empty month");
            let empty = CalendarReconciler::reconcile(
                year,
                month,
                self.today,
                &MonthSummary::new(),
                &BTreeSet::new(),
            )?;
            self.view.apply(ticket, empty, 0);
            return Ok(());
        };

        let summary = self.ledger.month_summary(name, year, month)?;
        let pending = pending_dates_for(&self.ledger.list_pending_requests()?, name);
        let attended = self.ledger.attendance_count(name)?;
        let view = CalendarReconciler::reconcile(year, month, self.today, &summary, &pending)?;

        self.view.apply(ticket, view, attended);
        Ok(())
    }

    /// Refresh, keeping the previous view when it fails.
    pub fn refresh_in_background(&mut self) -> bool {
        match self.refresh() {
            Ok(()) => true,
            Err(e) => {
                self.view.refresh_failed(&e);
                false
            }
        }
    }

    /// Re-check the session against the ledger, then refresh.
    ///
    /// Picks up punches made elsewhere; a failed check keeps the local
    /// session state.
    pub fn resync(&mut self) -> bool {
        if let Err(e) = self.tracker.reconcile(&self.ledger) {
            warn!(error = %e, "session reconciliation failed, keeping local state");
        }
        self.refresh_in_background()
    }

    pub fn show_month(&mut self, year: i32, month: u32) -> AppResult<()> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidDate(format!("{year}-{month:02}")));
        }
        if self.shown != (year, month) {
            self.shown = (year, month);
            self.view.mutation_completed();
        }
        self.refresh()
    }

    pub fn punch_in(&mut self, name: &str) -> AppResult<SessionId> {
        let outcome = self.tracker.punch_in(&self.ledger, name);
        // a rejected punch-in may have adopted a session opened elsewhere
        if outcome.is_ok() || self.tracker.is_active() {
            self.after_mutation();
        }
        outcome
    }

    pub fn punch_out(&mut self) -> AppResult<SessionId> {
        let outcome = self.tracker.punch_out(&self.ledger);
        // a rejected punch-out may still have reconciled local state
        if outcome.is_ok() || self.tracker.session().is_none() {
            self.after_mutation();
        }
        outcome
    }

    /// Punch in when idle (with the stored name), out when active.
    pub fn toggle_punch(&mut self) -> AppResult<Punch> {
        if self.tracker.is_active() {
            return self.punch_out().map(Punch::Out);
        }

        let Some(name) = self.tracker.display_name().map(str::to_string) else {
            return Err(AppError::Validation(
                "No display name stored. Run `rattendance in --name <NAME>` first.".into(),
            ));
        };
        self.punch_in(&name).map(Punch::In)
    }

    /// Fill the request form for `date` and submit it.
    pub fn submit_regularization(
        &mut self,
        date: NaiveDate,
        reason: RegularizationReason,
        notes: &str,
    ) -> AppResult<RequestId> {
        let Some(name) = self.tracker.display_name().map(str::to_string) else {
            return Err(AppError::Validation(
                "A display name is required to submit a request.".into(),
            ));
        };

        let rolled = self.roll_day();
        if rolled || self.shown != (date.year(), date.month()) || self.view.month().is_none() {
            self.show_month(date.year(), date.month())?;
        }
        let Some(view) = self.view.month() else {
            return Err(AppError::Other("month view unavailable".into()));
        };

        self.workflow.select(view, date)?;
        self.workflow.set_reason(reason);
        self.workflow.set_notes(notes);
        let id = self.workflow.submit(&self.ledger, view, &name)?;

        self.after_mutation();
        Ok(id)
    }

    pub fn sign_out(&mut self, force: bool) -> AppResult<()> {
        self.tracker.sign_out(force)?;
        self.workflow.cancel();
        self.view.clear();
        Ok(())
    }

    fn after_mutation(&mut self) {
        self.view.mutation_completed();
        self.refresh_in_background();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fake::FakeLedger;
    use crate::models::AttendanceStatus;
    use crate::state::{KEY_DISPLAY_NAME, MemoryStore};
    use std::cell::Cell;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn named(name: &str) -> MemoryStore {
        let mut store = MemoryStore::default();
        store.set(KEY_DISPLAY_NAME, name).unwrap();
        store
    }

    #[test]
    fn without_a_name_the_view_is_empty_and_the_ledger_untouched() {
        let ledger = FakeLedger::new();
        let d = Dashboard::open(
            &ledger,
            MemoryStore::default(),
            EligibilityCalculator::default(),
            today(),
        );
        assert_eq!(ledger.total_calls(), 0);
        assert_eq!(d.month().map(|m| m.len()), Some(31));
        assert_eq!(d.eligibility().attended_count, 0);
    }

    #[test]
    fn open_loads_counts_and_summary() {
        let ledger = FakeLedger::new();
        ledger.count.set(38);
        ledger
            .summary
            .borrow_mut()
            .insert("2026-10-01".into(), "Present".into());

        let d = Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        assert_eq!(d.eligibility().percentage, 76.0);
        assert_eq!(
            d.month().and_then(|m| m.status_of(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap())),
            Some(AttendanceStatus::Present)
        );
    }

    #[test]
    fn punching_refreshes_the_counts() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        let before = ledger.calls("attendance_count");

        assert!(matches!(d.toggle_punch().unwrap(), Punch::In(_)));
        assert_eq!(ledger.calls("attendance_count"), before + 1);

        ledger.count.set(1);
        assert!(matches!(d.toggle_punch().unwrap(), Punch::Out(_)));
        assert_eq!(d.eligibility().attended_count, 1);
    }

    #[test]
    fn toggle_without_a_name_is_a_validation_error() {
        let ledger = FakeLedger::new();
        let mut d = Dashboard::open(
            &ledger,
            MemoryStore::default(),
            EligibilityCalculator::default(),
            today(),
        );
        assert!(d.toggle_punch().unwrap_err().is_validation());
        assert_eq!(ledger.total_calls(), 0);
    }

    #[test]
    fn submitted_request_shows_as_pending_and_blocks_a_duplicate() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        let day = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();

        d.submit_regularization(day, RegularizationReason::ForgotToPunch, "bus late")
            .unwrap();
        assert_eq!(
            d.month().and_then(|m| m.status_of(day)),
            Some(AttendanceStatus::PendingApproval)
        );

        let calls = ledger.calls("create_regularization_request");
        let err = d
            .submit_regularization(day, RegularizationReason::ForgotToPunch, "again")
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(ledger.calls("create_regularization_request"), calls);
    }

    #[test]
    fn requests_for_another_month_switch_the_view() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        let day = NaiveDate::from_ymd_opt(2026, 9, 3).unwrap();

        d.submit_regularization(day, RegularizationReason::CollegeEvent, "hackathon")
            .unwrap();
        assert_eq!(d.shown_month(), (2026, 9));
        assert_eq!(d.month().map(|m| m.len()), Some(30));
    }

    #[test]
    fn failed_refresh_keeps_the_last_view() {
        let ledger = FakeLedger::new();
        ledger.count.set(12);
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());

        ledger.offline.set(true);
        assert!(!d.refresh_in_background());
        assert_eq!(d.eligibility().attended_count, 12);
        assert!(d.month().is_some());
    }

    #[test]
    fn punch_in_after_a_punch_elsewhere_adopts_that_session() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        let elsewhere = ledger.seed_open_session("Asha");

        assert!(d.toggle_punch().unwrap_err().is_state_conflict());
        assert!(d.tracker().is_active());
        assert_eq!(d.toggle_punch().unwrap(), Punch::Out(elsewhere));
    }

    #[test]
    fn resync_follows_sessions_opened_and_closed_elsewhere() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());

        let id = ledger.seed_open_session("Asha");
        assert!(d.resync());
        assert_eq!(d.tracker().session().map(|s| s.id.clone()), Some(id.clone()));

        ledger.close_session(&id).unwrap();
        assert!(d.resync());
        assert!(!d.tracker().is_active());
    }

    #[test]
    fn resync_offline_keeps_the_session() {
        let ledger = FakeLedger::new();
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        d.toggle_punch().unwrap();

        ledger.offline.set(true);
        assert!(!d.resync());
        assert!(d.tracker().is_active());
    }

    fn moving_clock(start: NaiveDate) -> (Today, Rc<Cell<NaiveDate>>) {
        let now = Rc::new(Cell::new(start));
        let source = Rc::clone(&now);
        (Today::Source(Box::new(move || source.get())), now)
    }

    #[test]
    fn refresh_after_midnight_moves_today() {
        let ledger = FakeLedger::new();
        let (clock, now) = moving_clock(today());
        let mut d = Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), clock);
        let next = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(d.month().unwrap().day(next).unwrap().is_future);

        now.set(next);
        d.refresh().unwrap();
        assert_eq!(d.today(), next);
        assert!(!d.month().unwrap().day(next).unwrap().is_future);
    }

    #[test]
    fn the_current_month_follows_a_month_change() {
        let ledger = FakeLedger::new();
        let (clock, now) = moving_clock(NaiveDate::from_ymd_opt(2026, 10, 31).unwrap());
        let mut d = Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), clock);
        assert_eq!(d.shown_month(), (2026, 10));

        now.set(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert!(d.refresh_in_background());
        assert_eq!(d.shown_month(), (2026, 11));
        assert_eq!(d.month().map(|m| m.len()), Some(30));
    }

    #[test]
    fn a_browsed_month_stays_put_across_midnight() {
        let ledger = FakeLedger::new();
        let (clock, now) = moving_clock(today());
        let mut d = Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), clock);
        d.show_month(2026, 9).unwrap();

        now.set(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        d.refresh().unwrap();
        assert_eq!(d.shown_month(), (2026, 9));
    }

    #[test]
    fn a_request_for_the_new_day_is_accepted_after_midnight() {
        let ledger = FakeLedger::new();
        let (clock, now) = moving_clock(today());
        let mut d = Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), clock);
        let next = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        now.set(next);
        assert!(
            d.submit_regularization(next, RegularizationReason::TechnicalError, "scanner down")
                .is_ok()
        );
    }

    #[test]
    fn sign_out_clears_the_view() {
        let ledger = FakeLedger::new();
        ledger.count.set(3);
        let mut d =
            Dashboard::open(&ledger, named("Asha"), EligibilityCalculator::default(), today());
        d.sign_out(false).unwrap();
        assert!(d.month().is_none());
        assert_eq!(d.tracker().display_name(), None);
    }
}

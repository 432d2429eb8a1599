//! Correction requests for elapsed days.

use crate::core::guard::InFlight;
use crate::errors::{AppError, AppResult};
use crate::ledger::Ledger;
use crate::models::{
    AttendanceStatus, MonthView, RegularizationReason, RegularizationRequest, RequestId,
};
use chrono::NaiveDate;
use std::cell::Cell;
use tracing::info;

/// Draft request being filled in by the student.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestForm {
    pub date: Option<NaiveDate>,
    pub reason: Option<RegularizationReason>,
    pub notes: String,
}

#[derive(Default)]
pub struct RegularizationWorkflow {
    form: RequestForm,
    busy: Cell<bool>,
}

impl RegularizationWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &RequestForm {
        &self.form
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Pick the day to regularize. Future days and days outside `view`
    /// cannot be selected.
    pub fn select(&mut self, view: &MonthView, date: NaiveDate) -> AppResult<()> {
        match view.day(date) {
            Some(day) if day.is_selectable() => {
                self.form.date = Some(date);
                Ok(())
            }
            Some(_) => Err(AppError::Validation(format!(
                "{date} is in the future and cannot be regularized."
            ))),
            None => Err(AppError::Validation(format!(
                "{date} is not part of {}.",
                view.title()
            ))),
        }
    }

    pub fn set_reason(&mut self, reason: RegularizationReason) {
        self.form.reason = Some(reason);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.form.notes = notes.into();
    }

    pub fn cancel(&mut self) {
        self.form = RequestForm::default();
    }

    /// Validate the form and send it.
    ///
    /// Every check runs before the ledger is contacted. The form is cleared
    /// on success and kept on failure so it can be resubmitted.
    pub fn submit<L: Ledger>(
        &mut self,
        ledger: &L,
        view: &MonthView,
        submitted_by: &str,
    ) -> AppResult<RequestId> {
        let request = self.validate(view, submitted_by)?;

        let id = {
            let _guard = InFlight::acquire(&self.busy, "regularization")?;
            ledger.create_regularization_request(&request)?
        };

        info!(request = id, date = %request.date, reason = %request.reason, "regularization submitted");
        self.form = RequestForm::default();
        Ok(id)
    }

    fn validate(&self, view: &MonthView, submitted_by: &str) -> AppResult<RegularizationRequest> {
        let submitted_by = submitted_by.trim();
        if submitted_by.is_empty() {
            return Err(AppError::Validation(
                "A display name is required to submit a request.".into(),
            ));
        }

        let Some(date) = self.form.date else {
            return Err(AppError::Validation("Select a date first.".into()));
        };

        let Some(day) = view.day(date) else {
            return Err(AppError::Validation(format!(
                "{date} is not part of {}.",
                view.title()
            )));
        };

        if !day.is_selectable() {
            return Err(AppError::Validation(format!(
                "{date} is in the future and cannot be regularized."
            )));
        }

        if day.status == Some(AttendanceStatus::PendingApproval) {
            return Err(AppError::Validation(format!(
                "A request for {date} is already pending approval."
            )));
        }

        let Some(reason) = self.form.reason else {
            return Err(AppError::InvalidReason("a reason is required".into()));
        };

        let notes = self.form.notes.trim();
        if notes.is_empty() {
            return Err(AppError::Validation(
                "Notes are required to explain the request.".into(),
            ));
        }

        Ok(RegularizationRequest {
            date,
            reason,
            notes: notes.to_string(),
            submitted_by: submitted_by.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::calendar::CalendarReconciler;
    use crate::ledger::MonthSummary;
    use crate::ledger::fake::FakeLedger;
    use std::collections::BTreeSet;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn view(pending: &[u32]) -> MonthView {
        let pending: BTreeSet<_> = pending.iter().map(|&day| d(day)).collect();
        CalendarReconciler::reconcile(2026, 10, d(16), &MonthSummary::new(), &pending).unwrap()
    }

    fn filled(day: u32) -> RegularizationWorkflow {
        let mut wf = RegularizationWorkflow::new();
        wf.form.date = Some(d(day));
        wf.set_reason(RegularizationReason::TechnicalError);
        wf.set_notes("scanner down");
        wf
    }

    #[test]
    fn complete_form_is_submitted_and_cleared() {
        let ledger = FakeLedger::new();
        let v = view(&[]);
        let mut wf = RegularizationWorkflow::new();
        wf.select(&v, d(14)).unwrap();
        wf.set_reason(RegularizationReason::TechnicalError);
        wf.set_notes("scanner down");

        let id = wf.submit(&ledger, &v, "Asha").unwrap();
        assert_eq!(id, 1);
        assert_eq!(wf.form(), &RequestForm::default());

        let pending = ledger.list_pending_requests().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].date, d(14));
        assert_eq!(pending[0].student_name, "Asha");
        assert_eq!(pending[0].notes, "scanner down");
    }

    #[test]
    fn future_date_cannot_be_selected_or_submitted() {
        let ledger = FakeLedger::new();
        let v = view(&[]);
        let mut wf = RegularizationWorkflow::new();
        assert!(wf.select(&v, d(20)).unwrap_err().is_validation());
        assert_eq!(wf.form().date, None);

        let mut wf = filled(20);
        assert!(wf.submit(&ledger, &v, "Asha").unwrap_err().is_validation());
        assert_eq!(ledger.total_calls(), 0);
    }

    #[test]
    fn missing_fields_are_rejected_without_a_ledger_call() {
        let ledger = FakeLedger::new();
        let v = view(&[]);

        let mut no_notes = filled(14);
        no_notes.set_notes("   ");
        assert!(no_notes.submit(&ledger, &v, "Asha").unwrap_err().is_validation());

        let mut no_reason = filled(14);
        no_reason.form.reason = None;
        assert!(no_reason.submit(&ledger, &v, "Asha").unwrap_err().is_validation());

        let mut no_date = filled(14);
        no_date.form.date = None;
        assert!(no_date.submit(&ledger, &v, "Asha").unwrap_err().is_validation());

        assert!(filled(14).submit(&ledger, &v, " ").unwrap_err().is_validation());

        assert_eq!(ledger.total_calls(), 0);
    }

    #[test]
    fn day_already_pending_is_rejected() {
        let ledger = FakeLedger::new();
        let v = view(&[14]);
        let mut wf = filled(14);
        assert!(wf.submit(&ledger, &v, "Asha").unwrap_err().is_validation());
        assert_eq!(ledger.total_calls(), 0);
    }

    #[test]
    fn failed_submission_keeps_the_form() {
        let ledger = FakeLedger::new();
        ledger.offline.set(true);
        let v = view(&[]);
        let mut wf = filled(14);

        assert!(wf.submit(&ledger, &v, "Asha").unwrap_err().is_transport());
        assert_eq!(wf.form().date, Some(d(14)));
        assert_eq!(wf.form().notes, "scanner down");
        assert!(!wf.is_busy());

        ledger.offline.set(false);
        assert!(wf.submit(&ledger, &v, "Asha").is_ok());
    }

    #[test]
    fn submission_in_flight_is_rejected() {
        let ledger = FakeLedger::new();
        let v = view(&[]);
        let mut wf = filled(14);
        wf.busy.set(true);
        assert!(wf.submit(&ledger, &v, "Asha").unwrap_err().is_state_conflict());
        assert_eq!(ledger.total_calls(), 0);
    }

    #[test]
    fn cancel_resets_the_form() {
        let mut wf = filled(3);
        wf.cancel();
        assert_eq!(wf.form(), &RequestForm::default());
    }
}

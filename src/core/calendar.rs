//! Derivation of a [`MonthView`] from the ledger month summary.

use crate::errors::{AppError, AppResult};
use crate::ledger::MonthSummary;
use crate::models::{AttendanceStatus, DayEntry, MonthView, PendingRequest};
use crate::utils::date::{all_days_of_month, parse_date};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub struct CalendarReconciler;

impl CalendarReconciler {
    /// Build the view of `year`/`month` as seen on `today`.
    ///
    /// Days after `today` are future and carry no status. Elapsed days take
    /// the ledger status, `Absent` when the ledger has none. An unresolved
    /// request shows as `PendingApproval` over `Absent` or `Shortage`, never
    /// over `Present` or `Regularized`.
    pub fn reconcile(
        year: i32,
        month: u32,
        today: NaiveDate,
        summary: &MonthSummary,
        pending: &BTreeSet<NaiveDate>,
    ) -> AppResult<MonthView> {
        let days = all_days_of_month(year, month);
        if days.is_empty() {
            return Err(AppError::InvalidDate(format!("{year}-{month:02}")));
        }

        let raw = Self::parse_summary(year, month, summary);

        let days = days
            .into_iter()
            .map(|date| {
                if date > today {
                    return DayEntry {
                        date,
                        status: None,
                        is_future: true,
                    };
                }

                let mut status = raw.get(&date).copied().unwrap_or(AttendanceStatus::Absent);

                if pending.contains(&date)
                    && matches!(
                        status,
                        AttendanceStatus::Absent | AttendanceStatus::Shortage
                    )
                {
                    status = AttendanceStatus::PendingApproval;
                }

                DayEntry {
                    date,
                    status: Some(status),
                    is_future: false,
                }
            })
            .collect();

        Ok(MonthView { year, month, days })
    }

    /// Typed statuses of the summary entries that belong to the month.
    fn parse_summary(
        year: i32,
        month: u32,
        summary: &MonthSummary,
    ) -> BTreeMap<NaiveDate, AttendanceStatus> {
        let mut out = BTreeMap::new();

        for (key, value) in summary {
            let Some(date) = parse_date(key) else {
                debug!(key = %key, "ignoring month summary entry with a malformed date");
                continue;
            };

            if date.year() != year || date.month() != month {
                debug!(%date, "ignoring month summary entry outside the month");
                continue;
            }

            out.insert(date, AttendanceStatus::normalize(value));
        }

        out
    }
}

/// Dates of the unresolved requests submitted by `name`.
pub fn pending_dates_for(requests: &[PendingRequest], name: &str) -> BTreeSet<NaiveDate> {
    requests
        .iter()
        .filter(|r| r.student_name.trim() == name.trim())
        .map(|r| r.date)
        .collect()
}

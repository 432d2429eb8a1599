use super::attendance_status::AttendanceStatus;
use crate::utils::date::month_name;
use chrono::NaiveDate;
use serde::Serialize;

/// One calendar day of a [`MonthView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    /// Always `None` for future days, always `Some` otherwise.
    pub status: Option<AttendanceStatus>,
    pub is_future: bool,
}

impl DayEntry {
    /// Only elapsed days (today included) can be regularized.
    pub fn is_selectable(&self) -> bool {
        !self.is_future
    }
}

/// Derived day-by-day status of a month, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayEntry>,
}

impl MonthView {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn status_of(&self, date: NaiveDate) -> Option<AttendanceStatus> {
        self.day(date).and_then(|d| d.status)
    }

    /// "October 2026"
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    /// (date, status) rows of every elapsed day, ascending by date.
    pub fn rows(&self) -> Vec<(NaiveDate, AttendanceStatus)> {
        let mut rows: Vec<_> = self
            .days
            .iter()
            .filter_map(|d| d.status.map(|s| (d.date, s)))
            .collect();
        rows.sort_by_key(|(date, _)| *date);
        rows
    }

    pub fn count(&self, status: AttendanceStatus) -> usize {
        self.days.iter().filter(|d| d.status == Some(status)).count()
    }
}

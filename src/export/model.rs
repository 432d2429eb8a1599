use crate::models::{EligibilitySnapshot, MonthView};
use crate::utils::formatting::percent;
use chrono::NaiveDateTime;
use serde::Serialize;

/// One elapsed day of the report.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DayRow {
    pub date: String,
    pub weekday: String,
    pub status: String,
    /// CSS-safe status token, for styling downstream.
    pub token: String,
}

/// Monthly attendance report of one student.
#[derive(Serialize, Clone, Debug)]
pub struct Report {
    pub student: String,
    pub month: String,
    pub generated_at: String,
    pub eligibility: EligibilitySnapshot,
    pub days: Vec<DayRow>,
}

impl Report {
    pub fn build(
        student: &str,
        view: &MonthView,
        eligibility: &EligibilitySnapshot,
        generated_at: NaiveDateTime,
    ) -> Self {
        let days = view
            .rows()
            .into_iter()
            .map(|(date, status)| DayRow {
                date: date.to_string(),
                weekday: date.format("%A").to_string(),
                status: status.label().to_string(),
                token: status.css_token().to_string(),
            })
            .collect();

        Self {
            student: student.to_string(),
            month: view.title(),
            generated_at: generated_at.format("%Y-%m-%d %H:%M").to_string(),
            eligibility: *eligibility,
            days,
        }
    }

    pub fn title(&self) -> String {
        format!("Attendance report - {}", self.month)
    }

    /// Header lines printed above the table.
    pub fn meta_lines(&self) -> Vec<String> {
        let e = &self.eligibility;
        let verdict = if e.is_eligible {
            "eligible".to_string()
        } else {
            format!("not eligible, {} more classes needed", e.classes_needed)
        };

        vec![
            format!("Student: {}", self.student),
            format!("Generated: {}", self.generated_at),
            format!(
                "Attendance: {} ({}/{}), {}",
                percent(e.percentage),
                e.attended_count,
                e.total_target,
                verdict
            ),
        ]
    }
}

pub(crate) fn get_headers() -> Vec<&'static str> {
    vec!["Date", "Day", "Status"]
}

pub(crate) fn days_to_table(days: &[DayRow]) -> Vec<Vec<String>> {
    days.iter()
        .map(|d| vec![d.date.clone(), d.weekday.clone(), d.status.clone()])
        .collect()
}

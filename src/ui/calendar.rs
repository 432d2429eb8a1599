//! Terminal rendering of the month view and eligibility.

use crate::models::{AttendanceStatus, EligibilitySnapshot, MonthView, Session};
use crate::utils::colors::{color_for_eligibility, color_for_status, paint};
use crate::utils::formatting::{bold, percent};
use crate::utils::table::Table;
use chrono::{Datelike, Local};
use std::env;
use std::io::{self, IsTerminal};

/// Colours only for an interactive terminal, and never with `NO_COLOR`.
pub fn use_color() -> bool {
    io::stdout().is_terminal() && env::var_os("NO_COLOR").is_none()
}

fn tint(text: &str, status: Option<AttendanceStatus>, color: bool) -> String {
    if color {
        paint(text, color_for_status(status))
    } else {
        text.to_string()
    }
}

/// Monday-first grid; each cell is the day number and its status marker,
/// `·` for future days.
pub fn grid(view: &MonthView, color: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{:^34}", view.title()),
        " Mo   Tu   We   Th   Fr   Sa   Su".to_string(),
    ];

    let Some(first) = view.days.first() else {
        return lines;
    };

    let offset = first.date.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<String> = vec!["    ".to_string(); offset];

    for day in &view.days {
        let marker = day.status.map(|s| s.marker()).unwrap_or('·');
        let cell = format!("{:>3}{}", day.date.day(), marker);
        cells.push(tint(&cell, day.status, color));
    }

    for week in cells.chunks(7) {
        lines.push(week.join(" ").trim_end().to_string());
    }

    lines
}

/// One row per elapsed day.
pub fn list(view: &MonthView, color: bool) -> String {
    let mut table = Table::new(["Date", "Day", "Status"]);
    for (date, status) in view.rows() {
        table.add_row(vec![
            date.to_string(),
            date.format("%a").to_string(),
            status.label().to_string(),
        ]);
    }

    if !color {
        return table.render();
    }

    // colour whole status cells after layout so widths stay right
    let mut out = table.render();
    for status in AttendanceStatus::ALL {
        out = out.replace(
            &format!("  {}\n", status.label()),
            &format!("  {}\n", tint(status.label(), Some(status), true)),
        );
    }
    out
}

pub fn legend(color: bool) -> String {
    let mut parts: Vec<String> = AttendanceStatus::ALL
        .iter()
        .map(|s| tint(&format!("{} {}", s.marker(), s.label()), Some(*s), color))
        .collect();
    parts.push(tint("· future", None, color));
    parts.join("   ")
}

pub fn eligibility_line(e: &EligibilitySnapshot, color: bool) -> String {
    let verdict = if e.is_eligible {
        "eligible".to_string()
    } else if e.classes_needed == 1 {
        "1 more class needed".to_string()
    } else {
        format!("{} more classes needed", e.classes_needed)
    };

    let pct = percent(e.percentage);
    let pct = if color {
        paint(&pct, color_for_eligibility(e.is_eligible))
    } else {
        pct
    };

    format!(
        "Attendance: {} ({}/{}), {}",
        pct, e.attended_count, e.total_target, verdict
    )
}

pub fn session_line(name: Option<&str>, session: Option<&Session>) -> String {
    let who = name.unwrap_or("(no display name)");
    match session {
        Some(s) => match s.started_at {
            Some(start) => {
                let mins = (Local::now().naive_local() - start).num_minutes().max(0);
                format!(
                    "{who}: punched in since {} ({}h{:02}m, session {})",
                    start.format("%Y-%m-%d %H:%M"),
                    mins / 60,
                    mins % 60,
                    s.id
                )
            }
            None => format!("{who}: punched in (session {})", s.id),
        },
        None => format!("{who}: not punched in"),
    }
}

pub fn print_month(view: &MonthView, eligibility: &EligibilitySnapshot, as_list: bool) {
    let color = use_color();

    if as_list {
        println!("{}\n", bold(&view.title()));
        print!("{}", list(view, color));
    } else {
        for line in grid(view, color) {
            println!("{line}");
        }
        println!();
        println!("{}", legend(color));
    }

    println!();
    println!("{}", eligibility_line(eligibility, color));
}

use crate::cli::Context;
use crate::errors::{AppError, AppResult};
use crate::export::{Report, ReportFormat, ReportLogic};
use chrono::Local;
use std::path::PathBuf;

pub fn handle(
    ctx: &Context,
    format: ReportFormat,
    file: Option<&str>,
    month: Option<&str>,
    force: bool,
) -> AppResult<()> {
    let (year, month) = ctx.month(month)?;

    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    let Some(student) = dashboard.tracker().display_name().map(str::to_string) else {
        return Err(AppError::Validation(
            "A display name is required for a report: run `rattendance in --name <NAME>` first."
                .into(),
        ));
    };

    dashboard.show_month(year, month)?;
    let Some(view) = dashboard.month() else {
        return Err(AppError::Other("month view unavailable".into()));
    };

    let report = Report::build(
        &student,
        view,
        dashboard.eligibility(),
        Local::now().naive_local(),
    );

    let path = match file {
        Some(f) => PathBuf::from(f),
        None => ReportLogic::default_file_name(&student, format),
    };

    ReportLogic::export(&report, format, &path, force)
}

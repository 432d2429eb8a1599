use crate::cli::Context;
use crate::errors::{AppError, AppResult};
use crate::models::RegularizationReason;
use crate::ui::messages::success;
use crate::utils::date::parse_date;

pub fn handle(ctx: &Context, date: &str, reason: &str, notes: &str) -> AppResult<()> {
    let day = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))?;
    let reason = RegularizationReason::from_code(reason)
        .ok_or_else(|| AppError::InvalidReason(reason.to_string()))?;

    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    let id = dashboard.submit_regularization(day, reason, notes)?;
    success(format!(
        "Request #{id} submitted for {day} ({reason}); awaiting approval."
    ));
    Ok(())
}

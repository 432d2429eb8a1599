use crate::cli::Context;
use crate::errors::{AppError, AppResult};
use crate::ui::calendar::print_month;

pub fn handle(ctx: &Context, month: Option<&str>, as_list: bool) -> AppResult<()> {
    let (year, month) = ctx.month(month)?;

    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;
    dashboard.show_month(year, month)?;

    let Some(view) = dashboard.month() else {
        return Err(AppError::Other("month view unavailable".into()));
    };
    print_month(view, dashboard.eligibility(), as_list);
    Ok(())
}

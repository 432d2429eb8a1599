use crate::cli::Context;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(ctx: &Context, force: bool) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    dashboard.sign_out(force)?;
    success("Signed out: display name and session forgotten.");
    Ok(())
}

use crate::cli::Context;
use crate::errors::AppResult;
use crate::ui::calendar::{eligibility_line, use_color};
use crate::ui::messages::{prompt, success};

/// `in`: punch in with `--name`, the stored name, or one read from stdin.
pub fn handle_in(ctx: &Context, name: Option<&str>) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    let name = match name {
        Some(n) => n.to_string(),
        None => match dashboard.tracker().display_name() {
            Some(stored) => stored.to_string(),
            None => prompt("Display name:")?,
        },
    };

    let id = dashboard.punch_in(&name)?;
    success(format!("Punched in as {} (session {id})", name.trim()));
    println!("{}", eligibility_line(dashboard.eligibility(), use_color()));
    Ok(())
}

/// `out`: close the open session.
pub fn handle_out(ctx: &Context) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    let id = dashboard.punch_out()?;
    success(format!("Punched out (session {id})"));
    println!("{}", eligibility_line(dashboard.eligibility(), use_color()));
    Ok(())
}

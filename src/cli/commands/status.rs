use crate::cli::Context;
use crate::errors::AppResult;
use crate::ui::calendar::{eligibility_line, session_line, use_color};
use crate::ui::messages::{header, warning};

pub fn handle(ctx: &Context) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;
    dashboard.refresh()?;

    let tracker = dashboard.tracker();
    if tracker.display_name().is_none() {
        warning("No display name stored yet: run `rattendance in --name <NAME>`.");
    }

    header("rAttendance status");
    println!("{}", session_line(tracker.display_name(), tracker.session()));
    println!("{}", eligibility_line(dashboard.eligibility(), use_color()));

    if let Some(url) = &ctx.cfg.tracker_url {
        println!("Tracker: {url}");
    }

    Ok(())
}

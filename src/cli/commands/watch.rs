use crate::cli::Context;
use crate::core::live;
use crate::errors::AppResult;
use crate::ui::messages::info;
use std::io;
use tokio::io::BufReader;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

pub fn handle(ctx: &Context) -> AppResult<()> {
    let ledger = ctx.ledger()?;
    let mut dashboard = ctx.dashboard(&ledger)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let stats = runtime.block_on(live::run(
        &mut dashboard,
        BufReader::new(tokio::io::stdin()),
        &mut out,
        ctx.cfg.refresh_interval(),
        shutdown,
    ));
    release(runtime);
    let stats = stats?;

    drop(out);
    info(format!(
        "Live view closed after {} refreshes and {} punches.",
        stats.refreshes, stats.punches
    ));
    Ok(())
}

/// Stop the runtime without joining its blocking threads: a stdin read
/// still waiting for a line cannot be cancelled and would otherwise hold
/// the process until Enter is pressed.
fn release(runtime: Runtime) {
    debug!("shutting down the live view runtime");
    runtime.shutdown_background();
}

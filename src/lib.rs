//! rAttendance library root.
//! Exposes the CLI parser, the high-level `run()` function and the
//! attendance core.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod models;
pub mod state;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::Context;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostics filter.
pub const LOG_ENV: &str = "RATTENDANCE_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, ctx: &Context) -> AppResult<()> {
    use crate::cli::commands as c;

    match &cli.command {
        Commands::Init => c::init::handle(ctx, cli.db.clone()),
        Commands::Config { .. } => c::config::handle(&cli.command, ctx),
        Commands::In { name } => c::punch::handle_in(ctx, name.as_deref()),
        Commands::Out => c::punch::handle_out(ctx),
        Commands::Status => c::status::handle(ctx),
        Commands::Calendar { month, list } => c::calendar::handle(ctx, month.as_deref(), *list),
        Commands::Regularize {
            date,
            reason,
            notes,
        } => c::regularize::handle(ctx, date, reason, notes),
        Commands::Requests { approve, reject } => c::requests::handle(ctx, *approve, *reject),
        Commands::Report {
            format,
            file,
            month,
            force,
        } => c::report::handle(ctx, *format, file.as_deref(), month.as_deref(), *force),
        Commands::Watch => c::watch::handle(ctx),
        Commands::Signout { force } => c::signout::handle(ctx, *force),
        Commands::Log { .. } => c::log::handle(&cli.command, ctx),
    }
}

/// Diagnostics go to stderr; `RATTENDANCE_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // a second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = Config::load()?;
    let ctx = Context::new(&cli, cfg)?;

    dispatch(&cli, &ctx)
}

use crate::cli::Context;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `init` command
///
/// Creates the config directory and file (not in test mode), then the
/// ledger database with all pending migrations.
pub fn handle(ctx: &Context, ledger_override: Option<String>) -> AppResult<()> {
    let cfg = Config::init_all(ledger_override, ctx.test)?;
    let ledger_path = cfg.ledger_path();

    info("Initializing rAttendance…");
    if !ctx.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Ledger     : {}", ledger_path.display());

    let pool = DbPool::new(&ledger_path.to_string_lossy())?;
    init_db(&pool.conn)?;

    audit(
        &pool.conn,
        "init",
        "",
        &format!("Ledger initialized at {}", ledger_path.display()),
    );

    success("rAttendance initialization completed!");
    Ok(())
}

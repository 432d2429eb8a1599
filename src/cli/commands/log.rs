use crate::cli::Context;
use crate::cli::parser::Commands;
use crate::core::log::LogLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let ledger = ctx.ledger()?;
        LogLogic::print_log(ledger.conn())?;
    }

    Ok(())
}

pub mod commands;
pub mod parser;

use crate::config::Config;
use crate::core::dashboard::{Dashboard, Today};
use crate::db::ledger::SqliteLedger;
use crate::errors::{AppError, AppResult};
use crate::state::FileStore;
use crate::utils::date::{parse_date, parse_month};
use chrono::{Datelike, Local, NaiveDate};
use parser::Cli;
use tracing::debug;

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub cfg: Config,
    /// Date at startup.
    pub today: NaiveDate,
    /// `--today`, when given.
    pub pinned_today: Option<NaiveDate>,
    pub test: bool,
    pub verbose: bool,
}

impl Context {
    /// Apply the global CLI overrides on top of the loaded config.
    pub fn new(cli: &Cli, mut cfg: Config) -> AppResult<Self> {
        if let Some(db) = &cli.db {
            cfg.ledger = db.clone();
        }
        if let Some(state) = &cli.state {
            cfg.state_file = state.clone();
        }

        let pinned_today = match &cli.today {
            Some(raw) => Some(parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.clone()))?),
            None => None,
        };

        Ok(Self {
            cfg,
            today: pinned_today.unwrap_or_else(crate::utils::date::today),
            pinned_today,
            test: cli.test,
            verbose: cli.verbose,
        })
    }

    pub fn ledger(&self) -> AppResult<SqliteLedger> {
        let path = self.cfg.ledger_path();
        debug!(ledger = %path.display(), "opening ledger");
        let ledger = SqliteLedger::open(&path.to_string_lossy(), self.cfg.min_session_minutes)?;

        // a pinned "today" keeps the wall-clock time of day
        match self.pinned_today {
            Some(day) => Ok(ledger.with_clock(move || day.and_time(Local::now().time()))),
            None => Ok(ledger),
        }
    }

    pub fn store(&self) -> AppResult<FileStore> {
        FileStore::open(self.cfg.state_path())
    }

    pub fn dashboard<'a>(
        &self,
        ledger: &'a SqliteLedger,
    ) -> AppResult<Dashboard<&'a SqliteLedger, FileStore>> {
        Ok(Dashboard::open(
            ledger,
            self.store()?,
            self.cfg.calculator()?,
            self.clock(),
        ))
    }

    fn clock(&self) -> Today {
        match self.pinned_today {
            Some(day) => Today::Fixed(day),
            None => Today::Live,
        }
    }

    /// `YYYY-MM`, or the current month.
    pub fn month(&self, raw: Option<&str>) -> AppResult<(i32, u32)> {
        match raw {
            Some(m) => parse_month(m).ok_or_else(|| AppError::InvalidDate(m.to_string())),
            None => Ok((self.today.year(), self.today.month())),
        }
    }
}

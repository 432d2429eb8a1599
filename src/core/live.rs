//! `watch`: live clock, periodic refresh and one-key commands.

use crate::core::dashboard::{Dashboard, Punch};
use crate::errors::AppResult;
use crate::ledger::Ledger;
use crate::state::StateStore;
use crate::utils::formatting::{hms, percent};
use chrono::Local;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

const CLOCK_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LiveStats {
    pub ticks: u64,
    pub refreshes: u64,
    pub punches: u64,
}

/// Run the live view until `q` or until `shutdown` resolves.
///
/// Closed input only disables the key commands; the clock and refresh keep
/// running. Timers live inside this future: returning (or dropping it)
/// cancels both.
pub async fn run<L, S, R, W, F>(
    dashboard: &mut Dashboard<L, S>,
    input: R,
    out: &mut W,
    refresh_every: Duration,
    shutdown: F,
) -> AppResult<LiveStats>
where
    L: Ledger,
    S: StateStore,
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future<Output = ()>,
{
    let mut stats = LiveStats::default();

    let mut clock = time::interval(CLOCK_TICK);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut refresh = time::interval_at(Instant::now() + refresh_every, refresh_every);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = input.lines();
    let mut input_open = true;

    tokio::pin!(shutdown);

    writeln!(out, "p = punch in/out, r = refresh, q = quit")?;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("live view interrupted");
                break;
            }

            line = lines.next_line(), if input_open => {
                match line? {
                    Some(cmd) => match cmd.trim() {
                        "q" => break,
                        "p" => {
                            stats.punches += 1;
                            punch(dashboard, out)?;
                        }
                        "r" => {
                            stats.refreshes += 1;
                            if !dashboard.resync() {
                                writeln!(out, "refresh failed, showing the last known values")?;
                            }
                        }
                        "" => {}
                        other => writeln!(out, "unknown command {other:?}: p, r or q")?,
                    },
                    None => {
                        debug!("input closed, key commands disabled");
                        input_open = false;
                    }
                }
            }

            _ = refresh.tick() => {
                stats.refreshes += 1;
                dashboard.resync();
            }

            _ = clock.tick() => {
                stats.ticks += 1;
                write!(out, "\r{}", status_line(dashboard))?;
                out.flush()?;
            }
        }
    }

    writeln!(out)?;
    Ok(stats)
}

fn punch<L: Ledger, S: StateStore, W: Write>(
    dashboard: &mut Dashboard<L, S>,
    out: &mut W,
) -> AppResult<()> {
    match dashboard.toggle_punch() {
        Ok(Punch::In(id)) => writeln!(out, "\npunched in ({id})")?,
        Ok(Punch::Out(id)) => writeln!(out, "\npunched out ({id})")?,
        Err(e) => writeln!(out, "\n{e}")?,
    }
    Ok(())
}

fn status_line<L: Ledger, S: StateStore>(dashboard: &Dashboard<L, S>) -> String {
    let now = Local::now().naive_local();
    let session = match dashboard.tracker().session() {
        Some(s) => match s.started_at {
            Some(start) => format!("IN {} for {}", s.id, hms((now - start).num_seconds())),
            None => format!("IN {}", s.id),
        },
        None => "OUT".to_string(),
    };

    let e = dashboard.eligibility();
    format!(
        "{}  {}  attendance {} ({}/{})",
        now.format("%H:%M:%S"),
        session,
        percent(e.percentage),
        e.attended_count,
        e.total_target
    )
}

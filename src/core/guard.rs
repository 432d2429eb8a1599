use crate::errors::{AppError, AppResult};
use std::cell::Cell;

/// Marks a user-initiated ledger mutation as outstanding.
///
/// While the guard is alive a second `acquire` on the same flag fails with a
/// `StateConflict`, so the same action cannot be re-triggered before the
/// first one has completed. The flag is released on drop, error paths
/// included.
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> InFlight<'a> {
    pub fn acquire(flag: &'a Cell<bool>, action: &str) -> AppResult<Self> {
        if flag.replace(true) {
            return Err(AppError::StateConflict(format!(
                "A {action} request is already in progress."
            )));
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

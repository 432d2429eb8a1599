#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Fixed "today" for every CLI run: Friday 16 October 2026.
pub const TODAY: &str = "2026-10-16";

pub fn rat() -> Command {
    let mut cmd = cargo_bin_cmd!("rattendance");
    cmd.env("NO_COLOR", "1").env_remove("RATTENDANCE_LOG");
    cmd
}

/// Temp ledger + state file pair, removed on creation.
pub struct TestEnv {
    pub db: String,
    pub state: String,
}

impl TestEnv {
    pub fn new(name: &str) -> Self {
        let db = temp_path(&format!("{name}_rattendance.sqlite"));
        let state = temp_path(&format!("{name}_state.yml"));
        Self { db, state }
    }

    /// `rattendance --db <db> --state <state> --test --today <TODAY>`
    pub fn cmd(&self) -> Command {
        let mut cmd = rat();
        cmd.args([
            "--db",
            &self.db,
            "--state",
            &self.state,
            "--test",
            "--today",
            TODAY,
        ]);
        cmd
    }

    /// Punch in as `name` and check it worked.
    pub fn punch_in(&self, name: &str) {
        self.cmd().args(["in", "--name", name]).assert().success();
    }
}

/// Path inside the temp dir, prefixed with the process id so concurrent
/// runs never share a file, with any leftover file removed.
pub fn temp_path(file: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_{file}", std::process::id()));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

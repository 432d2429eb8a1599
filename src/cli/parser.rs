use crate::export::ReportFormat;
use clap::{ArgGroup, Parser, Subcommand};

/// Command-line interface definition for rAttendance
#[derive(Parser)]
#[command(
    name = "rattendance",
    version = env!("CARGO_PKG_VERSION"),
    about = "A personal attendance tracker: punch in/out, monthly calendar, regularization requests and eligibility",
    long_about = None
)]
pub struct Cli {
    /// Override the ledger database path (useful for tests or a custom ledger)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the local state file (display name and open session)
    #[arg(global = true, long = "state")]
    pub state: Option<String>,

    /// Show debug diagnostics on stderr
    #[arg(global = true, long, short = 'v')]
    pub verbose: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(global = true, long = "today", hide = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the ledger database and configuration
    Init,

    /// Manage the configuration file (view, check or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(
            long = "check",
            help = "Check the configuration file for missing fields and add their defaults"
        )]
        check: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Punch in (open a session)
    In {
        /// Display name; stored for later punches
        #[arg(long)]
        name: Option<String>,
    },

    /// Punch out (close the open session)
    Out,

    /// Show the session state and the eligibility summary
    Status,

    /// Show the monthly attendance calendar
    Calendar {
        /// Month to show (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,

        /// One row per day instead of the grid
        #[arg(long)]
        list: bool,
    },

    /// Request manual correction of a past day
    Regularize {
        /// Day to regularize (YYYY-MM-DD)
        date: String,

        /// forgot | event | technical (or the full label)
        #[arg(long)]
        reason: String,

        /// Explanation for the approver
        #[arg(long)]
        notes: String,
    },

    /// List pending regularization requests, or resolve one (approver)
    #[command(group(ArgGroup::new("resolution").args(["approve", "reject"])))]
    Requests {
        #[arg(long, value_name = "ID")]
        approve: Option<i64>,

        #[arg(long, value_name = "ID")]
        reject: Option<i64>,
    },

    /// Export the monthly attendance report
    Report {
        #[arg(long, value_enum, default_value = "pdf")]
        format: ReportFormat,

        /// Output file (default: <Name>_Attendance.<ext>)
        #[arg(long, value_name = "FILE")]
        file: Option<String>,

        /// Month to export (YYYY-MM, default: current month)
        #[arg(long)]
        month: Option<String>,

        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },

    /// Live view: clock, periodic refresh, p = punch, r = refresh, q = quit
    Watch,

    /// Forget the stored display name and session
    Signout {
        /// Sign out even while punched in
        #[arg(long)]
        force: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

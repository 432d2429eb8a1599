pub mod calendar;
pub mod config;
pub mod init;
pub mod log;
pub mod punch;
pub mod regularize;
pub mod report;
pub mod requests;
pub mod signout;
pub mod status;
pub mod watch;

//! Unified application error type.
//! All modules (ledger, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Ledger / transport
    // ---------------------------
    #[error("Ledger error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Ledger unreachable: {0}")]
    Transport(String),

    // ---------------------------
    // Validation
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid regularization reason: {0}")]
    InvalidReason(String),

    // ---------------------------
    // State conflicts
    // ---------------------------
    #[error("{0}")]
    StateConflict(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

/// Coarse classification used to decide how an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Ledger unreachable or non-success answer.
    Transport,
    /// Input rejected before any ledger call.
    Validation,
    /// Local and ledger state disagree.
    StateConflict,
    Other,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Db(_) | AppError::Transport(_) => ErrorKind::Transport,
            AppError::Validation(_) | AppError::InvalidDate(_) | AppError::InvalidReason(_) => {
                ErrorKind::Validation
            }
            AppError::StateConflict(_) => ErrorKind::StateConflict,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_state_conflict(&self) -> bool {
        self.kind() == ErrorKind::StateConflict
    }
}

pub type AppResult<T> = Result<T, AppError>;

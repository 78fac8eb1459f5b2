//! # Application Errors
//!
//! Conditions that end the whole run. Record-level failures never surface
//! here; the engine logs them and moves on to the next record.

use crate::gateway::StoreError;
use ldif_import_core::ImportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The admin password environment variable is missing or empty.
    #[error("{0} not set")]
    MissingCredential(&'static str),

    /// The login exchange did not yield a token.
    #[error("Auth failed: {0}")]
    Login(StoreError),

    /// The create/set-password/read/delete round trip failed.
    #[error("Self-test failed: {0}")]
    SelfTest(String),

    /// The configuration file is unreadable or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The input could not be parsed.
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A store call needed for setup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

//! Error types for promptvault.
//!
//! This module defines the workspace-wide error enum used at the process
//! boundary. Library crates carry their own typed errors and convert into
//! [`AppError`] when they reach the CLI.

use thiserror::Error;

/// Unified error type for the promptvault CLI.
///
/// Every command returns `Result<T, AppError>`; the CLI maps the variant
/// to an exit code.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested artifact or version does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected because of the current state of the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input failed boundary validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend or protocol errors
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::NotFound(_) => 2,
            AppError::Conflict(_) => 3,
            AppError::Validation(_) => 4,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

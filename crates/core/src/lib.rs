//! promptvault core library
//!
//! This crate provides the foundational utilities shared by the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, BackendKind};
pub use error::{AppError, AppResult};
pub use logging::LogFormat;

//! Versioned prompt storage for promptvault.
//!
//! This crate provides:
//! - Prompt types and the `namespace#name` reference scheme
//! - The fixed-width version encoding used as the storage sort key
//! - The `StorageBackend` capability with in-memory and SQLite backends
//! - `VersionedStore`, which keeps a `LATEST` alias consistent with the
//!   highest accepted version through conditional atomic writes

pub mod backend;
pub mod backends;
pub mod error;
pub mod record;
pub mod store;
pub mod types;
pub mod validate;
pub mod version;

#[cfg(test)]
mod tests;

// Re-export main types
pub use backend::{Condition, RecordKey, StorageBackend, WriteItem};
pub use backends::{create_backend, MemoryBackend, SqliteBackend};
pub use error::{BackendError, StoreError, StoreResult};
pub use record::Record;
pub use store::VersionedStore;
pub use types::{Prompt, PromptMeta, Reference, VersionTag};
pub use validate::{validate_prompt, validate_version_request};
pub use version::{Precedence, Version, LATEST};

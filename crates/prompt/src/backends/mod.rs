//! Storage backend implementations and factory.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::backend::StorageBackend;
use promptvault_core::{AppConfig, AppError, AppResult, BackendKind};
use std::sync::Arc;

/// Create the storage backend selected by the configuration.
///
/// Called once per process; the returned handle is shared by every store
/// operation.
pub fn create_backend(config: &AppConfig) -> AppResult<Arc<dyn StorageBackend>> {
    config.validate()?;

    match config.backend {
        BackendKind::Memory => {
            tracing::warn!("Using in-memory backend; prompts will not outlive this process");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Sqlite => {
            let path = config.database_path();
            let backend = SqliteBackend::open(&path, &config.table).map_err(|e| {
                AppError::Store(format!("Failed to open SQLite store {:?}: {}", path, e))
            })?;
            Ok(Arc::new(backend))
        }
    }
}

//! Error types for the prompt store.
//!
//! [`BackendError`] is what a [`StorageBackend`](crate::backend::StorageBackend)
//! reports. [`StoreError`] is what [`VersionedStore`](crate::store::VersionedStore)
//! reports; every protocol outcome has its own variant so callers can tell a
//! missing prompt from a rejected version from a broken backend.

use promptvault_core::AppError;
use thiserror::Error;

/// Errors produced by a storage backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A write precondition did not hold; nothing was written.
    #[error("condition failed for {reference}/{versioning}")]
    ConditionFailed {
        reference: String,
        versioning: String,
    },

    /// A record did not have the shape the backend needs.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// SQLite reported an error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The backend could not service the call at all.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by the versioned store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record for the requested reference and version.
    #[error("prompt not found: {reference} at {version}")]
    NotFound { reference: String, version: String },

    /// The candidate version equals the current one.
    #[error("version {version} of {reference} already exists")]
    VersionAlreadyExists { reference: String, version: String },

    /// The candidate version is lower than the current one.
    #[error("version {version} of {reference} is not greater than current version {current}")]
    VersionNotGreater {
        reference: String,
        version: String,
        current: String,
    },

    /// Another writer moved LATEST between our read and our write.
    #[error("{reference} was modified concurrently; retry against the new latest version")]
    ConcurrentModification { reference: String },

    /// A version string could not be parsed.
    #[error("invalid version '{input}': {reason}")]
    VersionFormatInvalid { input: String, reason: String },

    /// A prompt failed boundary validation.
    #[error("invalid prompt: {0}")]
    Validation(String),

    /// Converting between a prompt and a stored record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The atomic write was rejected by the backend.
    #[error("write of {reference} failed: {source}")]
    WriteFailed {
        reference: String,
        #[source]
        source: BackendError,
    },

    /// Any other backend failure (typically on read).
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(message),
            StoreError::VersionAlreadyExists { .. }
            | StoreError::VersionNotGreater { .. }
            | StoreError::ConcurrentModification { .. } => AppError::Conflict(message),
            StoreError::VersionFormatInvalid { .. } | StoreError::Validation(_) => {
                AppError::Validation(message)
            }
            StoreError::Serialization(_) => AppError::Serialization(message),
            StoreError::WriteFailed { .. } | StoreError::Backend(_) => AppError::Store(message),
        }
    }
}

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let not_found: AppError = StoreError::NotFound {
            reference: "org#x".into(),
            version: "LATEST".into(),
        }
        .into();
        assert!(matches!(not_found, AppError::NotFound(_)));

        let conflict: AppError = StoreError::ConcurrentModification {
            reference: "org#x".into(),
        }
        .into();
        assert!(matches!(conflict, AppError::Conflict(_)));

        let invalid: AppError = StoreError::VersionFormatInvalid {
            input: "1".into(),
            reason: "short".into(),
        }
        .into();
        assert!(matches!(invalid, AppError::Validation(_)));

        let backend: AppError =
            StoreError::Backend(BackendError::Unavailable("down".into())).into();
        assert!(matches!(backend, AppError::Store(_)));
    }

    #[test]
    fn test_messages_name_the_versions() {
        let err = StoreError::VersionNotGreater {
            reference: "org#x".into(),
            version: "0.9.9".into(),
            current: "1.0.1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0.9.9"));
        assert!(msg.contains("1.0.1"));
    }
}

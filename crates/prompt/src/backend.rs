//! The [`StorageBackend`] capability the versioned store is built on.
//!
//! A backend is a key-value table keyed by (`reference`, `versioning`). It
//! needs exactly two operations: an exact-match query and an all-or-nothing
//! multi-item write with per-item preconditions. Backends are swappable
//! without changing the store.

use crate::error::BackendError;
use crate::record::{Record, REFERENCE_FIELD, VERSIONING_FIELD};
use serde_json::Value;

/// Primary key of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub reference: String,
    pub versioning: String,
}

impl RecordKey {
    pub fn new(reference: impl Into<String>, versioning: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            versioning: versioning.into(),
        }
    }

    /// Extract the key fields from a record.
    pub fn of(record: &Record) -> Result<Self, BackendError> {
        let field = |name: &str| -> Result<String, BackendError> {
            record
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    BackendError::InvalidRecord(format!("missing string field '{}'", name))
                })
        };
        Ok(Self::new(field(REFERENCE_FIELD)?, field(VERSIONING_FIELD)?))
    }
}

/// Precondition on the record currently stored under a write's key.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No record exists under the key.
    NotExists,
    /// A record exists and `field` holds exactly `value`.
    FieldEquals { field: String, value: Value },
}

impl Condition {
    /// Evaluate against the currently stored record, if any.
    pub fn holds(&self, existing: Option<&Record>) -> bool {
        match (self, existing) {
            (Condition::NotExists, None) => true,
            (Condition::NotExists, Some(_)) => false,
            (Condition::FieldEquals { field, value }, Some(record)) => {
                record.get(field) == Some(value)
            }
            (Condition::FieldEquals { .. }, None) => false,
        }
    }
}

/// One record to put as part of an atomic write.
#[derive(Debug, Clone)]
pub struct WriteItem {
    pub record: Record,
    pub condition: Option<Condition>,
}

impl WriteItem {
    /// Unconditional put (replaces any existing record).
    pub fn put(record: Record) -> Self {
        Self {
            record,
            condition: None,
        }
    }

    /// Attach a precondition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn key(&self) -> Result<RecordKey, BackendError> {
        RecordKey::of(&self.record)
    }
}

/// Resolve the keys of a batch, rejecting duplicates.
///
/// Two items under one key in a single atomic write have no well-defined
/// outcome, so the whole batch is refused.
pub fn batch_keys(items: &[WriteItem]) -> Result<Vec<RecordKey>, BackendError> {
    let mut keys = Vec::with_capacity(items.len());
    for item in items {
        let key = item.key()?;
        if keys.contains(&key) {
            return Err(BackendError::InvalidRecord(format!(
                "duplicate key {}/{} in one atomic write",
                key.reference, key.versioning
            )));
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Trait for storage backends.
///
/// Implementations must be safe to share between concurrent callers.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Backend name (e.g., "memory", "sqlite").
    fn backend_name(&self) -> &str;

    /// Exact-match lookup by partition key and sort key.
    async fn query(&self, reference: &str, versioning: &str) -> Result<Vec<Record>, BackendError>;

    /// Commit every item or none of them.
    ///
    /// All conditions are evaluated against the state before the write. If
    /// any fails, nothing is written and [`BackendError::ConditionFailed`]
    /// names the first failing key. No concurrent reader ever observes a
    /// subset of the items.
    async fn atomic_write(&self, items: Vec<WriteItem>) -> Result<(), BackendError>;
}

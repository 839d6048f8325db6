//! In-memory implementation of [`StorageBackend`].
//!
//! Used by tests and by `--backend memory`. Semantics match the SQLite
//! backend: conditions are checked and items applied under one write lock,
//! so a batch is either fully visible or not visible at all.

use crate::backend::{batch_keys, RecordKey, StorageBackend, WriteItem};
use crate::error::BackendError;
use crate::record::Record;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: RwLock<BTreeMap<RecordKey, Record>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// A poisoned lock still reports its contents; batches are applied only
    /// after every condition has passed.
    pub fn len(&self) -> usize {
        match self.items.read() {
            Ok(items) => items.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> BackendError {
    BackendError::Unavailable("memory backend lock poisoned".to_string())
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn query(&self, reference: &str, versioning: &str) -> Result<Vec<Record>, BackendError> {
        let items = self.items.read().map_err(poisoned)?;
        let key = RecordKey::new(reference, versioning);
        Ok(items.get(&key).cloned().into_iter().collect())
    }

    async fn atomic_write(&self, items: Vec<WriteItem>) -> Result<(), BackendError> {
        let keys = batch_keys(&items)?;
        let mut stored = self.items.write().map_err(poisoned)?;

        for (item, key) in items.iter().zip(&keys) {
            if let Some(condition) = &item.condition {
                if !condition.holds(stored.get(key)) {
                    tracing::debug!(
                        reference = %key.reference,
                        versioning = %key.versioning,
                        "Condition failed, discarding batch"
                    );
                    return Err(BackendError::ConditionFailed {
                        reference: key.reference.clone(),
                        versioning: key.versioning.clone(),
                    });
                }
            }
        }

        for (item, key) in items.into_iter().zip(keys) {
            stored.insert(key, item.record);
        }

        Ok(())
    }
}

//! Racing writers on one reference.

use crate::backend::{StorageBackend, WriteItem};
use crate::backends::{MemoryBackend, SqliteBackend};
use crate::error::{BackendError, StoreError};
use crate::record::Record;
use crate::store::VersionedStore;
use crate::types::{Prompt, Reference};
use std::sync::Arc;
use tokio::sync::Barrier;

/// Holds every writer at the write step until all of them have read
/// LATEST, which forces the interleaving the write condition guards
/// against.
#[derive(Debug)]
struct GatedBackend {
    inner: Arc<dyn StorageBackend>,
    gate: Barrier,
}

#[async_trait::async_trait]
impl StorageBackend for GatedBackend {
    fn backend_name(&self) -> &str {
        "gated"
    }

    async fn query(&self, reference: &str, versioning: &str) -> Result<Vec<Record>, BackendError> {
        self.inner.query(reference, versioning).await
    }

    async fn atomic_write(&self, items: Vec<WriteItem>) -> Result<(), BackendError> {
        self.gate.wait().await;
        self.inner.atomic_write(items).await
    }
}

fn example(version: &str) -> Prompt {
    Prompt::new("org", "example", format!("body {}", version), version)
        .with_team("platform")
        .with_author("ada")
}

async fn race(inner: Arc<dyn StorageBackend>) {
    // Seed without the gate.
    VersionedStore::new(inner.clone())
        .put(example("1.0.0"))
        .await
        .unwrap();

    let versions = ["1.0.1", "1.0.2", "2.0.0"];
    let store = VersionedStore::new(Arc::new(GatedBackend {
        inner: inner.clone(),
        gate: Barrier::new(versions.len()),
    }));

    let results =
        futures::future::join_all(versions.iter().map(|v| store.put(example(v)))).await;

    let committed: Vec<&Prompt> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(committed.len(), 1, "exactly one writer should win: {:?}", results);

    for result in &results {
        if let Err(err) = result {
            assert!(
                matches!(err, StoreError::ConcurrentModification { .. }),
                "unexpected error: {:?}",
                err
            );
        }
    }

    let reader = VersionedStore::new(inner);
    let latest = reader
        .get(&Reference::new("org", "example"), "LATEST")
        .await
        .unwrap();
    assert_eq!(latest.version, committed[0].version);

    // Losers left no snapshot behind.
    for v in versions.iter().filter(|v| **v != committed[0].version) {
        assert!(matches!(
            reader.get(&Reference::new("org", "example"), v).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}

#[tokio::test]
async fn test_racing_writers_memory() {
    race(Arc::new(MemoryBackend::new())).await;
}

#[tokio::test]
async fn test_racing_writers_sqlite() {
    race(Arc::new(SqliteBackend::open_in_memory("prompts").unwrap())).await;
}

#[tokio::test]
async fn test_racing_first_versions() {
    let inner: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let store = VersionedStore::new(Arc::new(GatedBackend {
        inner: inner.clone(),
        gate: Barrier::new(2),
    }));

    let (a, b) = tokio::join!(store.put(example("1.0.0")), store.put(example("3.0.0")));
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
}

//! End-to-end versioning behavior of the store, run against every backend.

use crate::backend::{StorageBackend, WriteItem};
use crate::backends::{MemoryBackend, SqliteBackend};
use crate::error::{BackendError, StoreError};
use crate::record::Record;
use crate::store::VersionedStore;
use crate::types::{Prompt, Reference};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Backend whose writes can be switched to fail.
#[derive(Debug, Default)]
struct FlakyBackend {
    inner: MemoryBackend,
    fail_writes: AtomicBool,
}

#[async_trait::async_trait]
impl StorageBackend for FlakyBackend {
    fn backend_name(&self) -> &str {
        "flaky"
    }

    async fn query(&self, reference: &str, versioning: &str) -> Result<Vec<Record>, BackendError> {
        self.inner.query(reference, versioning).await
    }

    async fn atomic_write(&self, items: Vec<WriteItem>) -> Result<(), BackendError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("write throttled".to_string()));
        }
        self.inner.atomic_write(items).await
    }
}

/// Backend whose reads always fail.
#[derive(Debug)]
struct BrokenReads;

#[async_trait::async_trait]
impl StorageBackend for BrokenReads {
    fn backend_name(&self) -> &str {
        "broken"
    }

    async fn query(&self, _: &str, _: &str) -> Result<Vec<Record>, BackendError> {
        Err(BackendError::Unavailable("network down".to_string()))
    }

    async fn atomic_write(&self, _: Vec<WriteItem>) -> Result<(), BackendError> {
        Ok(())
    }
}

fn backends() -> Vec<Arc<dyn StorageBackend>> {
    vec![
        Arc::new(MemoryBackend::new()),
        Arc::new(SqliteBackend::open_in_memory("prompts").unwrap()),
    ]
}

fn example(version: &str, text: &str) -> Prompt {
    Prompt::new("org", "example", text, version)
        .with_team("platform")
        .with_author("ada")
        .with_description("Example prompt")
}

fn reference() -> Reference {
    Reference::new("org", "example")
}

#[tokio::test]
async fn test_first_write_visible_under_both_keys() {
    for backend in backends() {
        let store = VersionedStore::new(backend);
        store.put(example("1.0.0", "first")).await.unwrap();

        let latest = store.get(&reference(), "LATEST").await.unwrap();
        let pinned = store.get(&reference(), "1.0.0").await.unwrap();

        assert_eq!(latest.version, "1.0.0");
        assert_eq!(latest, pinned);
        assert_eq!(latest.text, "first");
    }
}

#[tokio::test]
async fn test_monotonic_acceptance_keeps_old_snapshot() {
    for backend in backends() {
        let store = VersionedStore::new(backend);
        store.put(example("1.0.0", "first")).await.unwrap();
        store.put(example("1.0.1", "second")).await.unwrap();

        let latest = store.get(&reference(), "LATEST").await.unwrap();
        assert_eq!(latest.version, "1.0.1");
        assert_eq!(latest.text, "second");

        let old = store.get(&reference(), "1.0.0").await.unwrap();
        assert_eq!(old.version, "1.0.0");
        assert_eq!(old.text, "first");
    }
}

#[tokio::test]
async fn test_equal_version_rejected() {
    for backend in backends() {
        let store = VersionedStore::new(backend);
        store.put(example("1.0.0", "first")).await.unwrap();
        store.put(example("1.0.1", "second")).await.unwrap();

        let err = store.put(example("1.0.1", "again")).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionAlreadyExists { .. }));

        // Equality is numeric, not textual.
        let err = store.put(example("01.0.001", "again")).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionAlreadyExists { .. }));

        let latest = store.get(&reference(), "LATEST").await.unwrap();
        assert_eq!(latest.text, "second");
    }
}

#[tokio::test]
async fn test_regression_rejected() {
    for backend in backends() {
        let store = VersionedStore::new(backend);
        store.put(example("1.0.0", "first")).await.unwrap();
        store.put(example("1.0.1", "second")).await.unwrap();

        match store.put(example("0.9.9", "older")).await {
            Err(StoreError::VersionNotGreater {
                version, current, ..
            }) => {
                assert_eq!(version, "0.9.9");
                assert_eq!(current, "1.0.1");
            }
            other => panic!("expected VersionNotGreater, got {:?}", other),
        }

        let missing = store.get(&reference(), "0.9.9").await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }
}

#[tokio::test]
async fn test_numeric_ordering_across_segment_widths() {
    for backend in backends() {
        let store = VersionedStore::new(backend);
        store.put(example("1.2.3", "a")).await.unwrap();
        store.put(example("1.10.0", "b")).await.unwrap();

        let err = store.put(example("1.9.9", "c")).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionNotGreater { .. }));

        let latest = store.get(&reference(), "").await.unwrap();
        assert_eq!(latest.version, "1.10.0");
    }
}

#[tokio::test]
async fn test_failed_write_leaves_nothing_visible() {
    let backend = Arc::new(FlakyBackend::default());
    let store = VersionedStore::new(backend.clone());
    store.put(example("1.0.0", "first")).await.unwrap();

    backend.fail_writes.store(true, Ordering::SeqCst);
    let err = store.put(example("1.1.0", "second")).await.unwrap_err();
    assert!(matches!(err, StoreError::WriteFailed { .. }));

    let latest = store.get(&reference(), "LATEST").await.unwrap();
    assert_eq!(latest.version, "1.0.0");
    assert!(matches!(
        store.get(&reference(), "1.1.0").await,
        Err(StoreError::NotFound { .. })
    ));
    assert_eq!(backend.inner.len(), 2);

    // Once the backend recovers the same version is accepted.
    backend.fail_writes.store(false, Ordering::SeqCst);
    store.put(example("1.1.0", "second")).await.unwrap();
    assert_eq!(
        store.get(&reference(), "LATEST").await.unwrap().version,
        "1.1.0"
    );
}

#[tokio::test]
async fn test_read_failure_is_not_treated_as_first_version() {
    let store = VersionedStore::new(Arc::new(BrokenReads));

    let err = store.put(example("1.0.0", "first")).await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));

    let err = store.get(&reference(), "LATEST").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}

#[tokio::test]
async fn test_stored_version_is_encoded() {
    let backend = Arc::new(MemoryBackend::new());
    let store = VersionedStore::new(backend.clone());
    store.put(example("1.2.3", "body")).await.unwrap();

    let raw = backend.query("org#example", "0001.0002.0003").await.unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["version"], "0001.0002.0003");

    let latest = backend.query("org#example", "LATEST").await.unwrap();
    assert_eq!(latest[0]["version"], "0001.0002.0003");
    assert_eq!(latest[0]["team"], "platform");
}

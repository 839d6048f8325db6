//! Versioned prompt store.
//!
//! Every accepted `put` writes two records in one atomic batch: an
//! immutable snapshot keyed by the encoded version, and the `LATEST` alias.
//! Versions for a reference must strictly increase. The batch is
//! conditional on `LATEST` still holding the version read before the
//! check, so two writers racing from the same read cannot both commit.

use crate::backend::{Condition, StorageBackend, WriteItem};
use crate::error::{BackendError, StoreError, StoreResult};
use crate::record::{from_record, to_record, VERSION_FIELD};
use crate::types::{Prompt, Reference, VersionTag};
use crate::version::{self, Precedence, Version};
use serde_json::Value;
use std::sync::Arc;

/// Versioned prompt store over an injected [`StorageBackend`].
#[derive(Debug, Clone)]
pub struct VersionedStore {
    backend: Arc<dyn StorageBackend>,
}

impl VersionedStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Fetch a prompt by reference and version request.
    ///
    /// An empty request or `LATEST` selects the alias; anything else must be
    /// a dotted version. The returned prompt carries the dotted version.
    ///
    /// # Example
    /// ```no_run
    /// use promptvault_prompt::{MemoryBackend, Reference, VersionedStore};
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = VersionedStore::new(Arc::new(MemoryBackend::new()));
    /// let prompt = store.get(&Reference::new("org", "example"), "1.0.0").await?;
    /// println!("{}", prompt.text);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, reference: &Reference, version: &str) -> StoreResult<Prompt> {
        let tag = VersionTag::parse_request(version)?;
        self.get_tag(reference, &tag).await
    }

    /// Fetch a prompt by an already parsed tag.
    pub async fn get_tag(&self, reference: &Reference, tag: &VersionTag) -> StoreResult<Prompt> {
        let mut prompt = self.fetch_encoded(reference, tag).await?;
        prompt.version = version::decode(&prompt.version)?;
        Ok(prompt)
    }

    /// Read the record under `tag`, leaving its version encoded.
    async fn fetch_encoded(&self, reference: &Reference, tag: &VersionTag) -> StoreResult<Prompt> {
        let sort_key = tag.sort_key();
        tracing::debug!(reference = %reference, versioning = %sort_key, "Querying prompt");

        let records = self.backend.query(reference.as_str(), &sort_key).await?;

        // Keys are exact, so at most one record comes back.
        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                reference: reference.to_string(),
                version: tag.to_string(),
            })?;

        from_record(record)
    }

    /// Store a new version of a prompt.
    ///
    /// Fails with [`StoreError::VersionAlreadyExists`] when the version equals
    /// the current one, [`StoreError::VersionNotGreater`] when it is lower,
    /// and [`StoreError::ConcurrentModification`] when another writer got in
    /// between the read and the write. Returns the stored prompt with its
    /// dotted, normalized version.
    pub async fn put(&self, prompt: Prompt) -> StoreResult<Prompt> {
        let version = Version::parse(&prompt.version)?;
        let encoded = version.encode();
        let reference = prompt.reference();

        let latest_condition = match self.fetch_encoded(&reference, &VersionTag::Latest).await {
            Ok(current) => {
                self.check_newer(&reference, &current.version, &encoded, version)?;
                Condition::FieldEquals {
                    field: VERSION_FIELD.to_string(),
                    value: Value::String(current.version),
                }
            }
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!(reference = %reference, "First version for reference");
                Condition::NotExists
            }
            Err(e) => return Err(e),
        };

        let mut stored = prompt;
        stored.version = encoded;

        let items = vec![
            WriteItem::put(to_record(&stored, &VersionTag::Version(version))?)
                .with_condition(Condition::NotExists),
            WriteItem::put(to_record(&stored, &VersionTag::Latest)?)
                .with_condition(latest_condition),
        ];

        match self.backend.atomic_write(items).await {
            Ok(()) => {}
            Err(BackendError::ConditionFailed { .. }) => {
                tracing::warn!(reference = %reference, version = %version, "Concurrent write detected");
                return Err(StoreError::ConcurrentModification {
                    reference: reference.to_string(),
                });
            }
            Err(source) => {
                return Err(StoreError::WriteFailed {
                    reference: reference.to_string(),
                    source,
                });
            }
        }

        tracing::info!(reference = %reference, version = %version, "Stored prompt version");

        stored.version = version.to_string();
        Ok(stored)
    }

    /// Reject `candidate` unless it is strictly greater than `current_encoded`.
    fn check_newer(
        &self,
        reference: &Reference,
        current_encoded: &str,
        candidate_encoded: &str,
        candidate: Version,
    ) -> StoreResult<()> {
        if current_encoded == candidate_encoded {
            tracing::warn!(reference = %reference, version = %candidate, "Version already exists");
            return Err(StoreError::VersionAlreadyExists {
                reference: reference.to_string(),
                version: candidate.to_string(),
            });
        }

        if version::compare(current_encoded, candidate_encoded)? == Precedence::Greater {
            let current = version::decode(current_encoded)?;
            tracing::warn!(
                reference = %reference,
                version = %candidate,
                current = %current,
                "Version not greater than current"
            );
            return Err(StoreError::VersionNotGreater {
                reference: reference.to_string(),
                version: candidate.to_string(),
                current,
            });
        }

        Ok(())
    }
}

//! Get command handler.
//!
//! Fetches a prompt by namespace and name, at a pinned version or LATEST.

use clap::Args;
use promptvault_core::AppResult;
use promptvault_prompt::{validate_version_request, Prompt, Reference, VersionedStore, LATEST};

/// Fetch a prompt
#[derive(Args, Debug)]
pub struct GetCommand {
    /// Prompt namespace
    pub namespace: String,

    /// Prompt name
    pub name: String,

    /// Version to fetch (LATEST or major.minor.patch)
    #[arg(default_value = LATEST)]
    pub version: String,

    /// Pretty-print the prompt
    #[arg(long)]
    pub pretty: bool,
}

impl GetCommand {
    pub async fn execute(&self, store: &VersionedStore) -> AppResult<Prompt> {
        tracing::info!("Executing get command for {}/{}", self.namespace, self.name);

        let tag = validate_version_request(&self.version)?;
        let reference = Reference::new(&self.namespace, &self.name);

        Ok(store.get_tag(&reference, &tag).await?)
    }
}

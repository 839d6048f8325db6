//! Put command handler.
//!
//! Stores a new version of a prompt read as JSON from a file or stdin.

use clap::Args;
use promptvault_core::{AppError, AppResult};
use promptvault_prompt::{validate_prompt, Prompt, VersionedStore};
use std::io::Read;
use std::path::PathBuf;

/// Store a new prompt version
#[derive(Args, Debug)]
pub struct PutCommand {
    /// JSON file holding the prompt ("-" or omitted reads stdin)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Pretty-print the stored prompt
    #[arg(long)]
    pub pretty: bool,
}

impl PutCommand {
    pub async fn execute(&self, store: &VersionedStore) -> AppResult<Prompt> {
        tracing::info!("Executing put command");
        tracing::debug!("Put options: {:?}", self);

        let body = self.read_body()?;
        let prompt = parse_prompt(&body)?;

        validate_prompt(&prompt)?;
        tracing::debug!(
            "Validated prompt {} version {}",
            prompt.reference(),
            prompt.version
        );

        Ok(store.put(prompt).await?)
    }

    fn read_body(&self) -> AppResult<String> {
        match &self.file {
            Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path).map_err(|e| {
                AppError::Validation(format!("Failed to read prompt file {:?}: {}", path, e))
            }),
            _ => {
                let mut body = String::new();
                std::io::stdin().read_to_string(&mut body)?;
                Ok(body)
            }
        }
    }
}

/// Parse a prompt from its JSON request body.
fn parse_prompt(body: &str) -> AppResult<Prompt> {
    serde_json::from_str(body)
        .map_err(|e| AppError::Validation(format!("Invalid prompt JSON: {}", e)))
}

//! Boundary validation for prompts and version requests.
//!
//! The store trusts its inputs to be complete; these checks run first at
//! the edge (the CLI).

use crate::error::{StoreError, StoreResult};
use crate::types::{Prompt, Reference, VersionTag};
use crate::version::{Version, LATEST};

/// Validate a prompt before it is handed to the store.
pub fn validate_prompt(prompt: &Prompt) -> StoreResult<()> {
    let required = [
        ("namespace", &prompt.namespace),
        ("team", &prompt.team),
        ("name", &prompt.name),
        ("text", &prompt.text),
        ("version", &prompt.version),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(StoreError::Validation(format!(
                "Prompt {} cannot be empty",
                field
            )));
        }
    }

    for (field, value) in [("namespace", &prompt.namespace), ("name", &prompt.name)] {
        if value.contains(Reference::SEPARATOR) {
            return Err(StoreError::Validation(format!(
                "Prompt {} cannot contain '{}'",
                field,
                Reference::SEPARATOR
            )));
        }
    }

    if prompt.meta.authors.iter().all(|a| a.trim().is_empty()) {
        return Err(StoreError::Validation(
            "Prompt meta.authors must name at least one author".to_string(),
        ));
    }

    if prompt.version == LATEST {
        return Err(StoreError::Validation(format!(
            "{} is reserved and cannot be used as a prompt version",
            LATEST
        )));
    }

    Version::parse(&prompt.version)?;

    Ok(())
}

/// Validate a version request: `LATEST`, empty, or a dotted triple with
/// 1–4 digit segments.
pub fn validate_version_request(request: &str) -> StoreResult<VersionTag> {
    VersionTag::parse_request(request)
}

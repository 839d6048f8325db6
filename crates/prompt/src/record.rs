//! Mapping between [`Prompt`] values and flat backend records.
//!
//! A record is a JSON object holding the partition key (`reference`), the
//! sort key (`versioning`) and every prompt field, with `version` already in
//! encoded form.

use crate::error::{StoreError, StoreResult};
use crate::types::{Prompt, Reference, VersionTag};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored item: field name to value.
pub type Record = Map<String, Value>;

pub const REFERENCE_FIELD: &str = "reference";
pub const VERSIONING_FIELD: &str = "versioning";
pub const VERSION_FIELD: &str = "version";

#[derive(Serialize, Deserialize)]
struct StoredPrompt {
    reference: Reference,
    versioning: String,
    #[serde(flatten)]
    prompt: Prompt,
}

/// Build the record for `prompt` under `tag`.
///
/// `prompt.version` is written as given; the store encodes it beforehand.
pub fn to_record(prompt: &Prompt, tag: &VersionTag) -> StoreResult<Record> {
    let stored = StoredPrompt {
        reference: prompt.reference(),
        versioning: tag.sort_key(),
        prompt: prompt.clone(),
    };

    match serde_json::to_value(stored)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "prompt serialized to {} instead of an object",
            type_name(&other)
        ))),
    }
}

/// Rebuild a prompt from a stored record. The version stays encoded.
pub fn from_record(record: Record) -> StoreResult<Prompt> {
    let stored: StoredPrompt = serde_json::from_value(Value::Object(record))?;
    Ok(stored.prompt)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Prompt types.
//!
//! This module defines the stored entity and the keys it is stored under.

use crate::error::StoreResult;
use crate::version::{Version, LATEST};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, versioned prompt.
///
/// The field names are the wire names used both in the JSON a caller sends
/// and in the records written to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Namespace owning the prompt (first half of the reference)
    #[serde(default)]
    pub namespace: String,

    /// Team responsible for the prompt
    #[serde(default)]
    pub team: String,

    /// Prompt name, unique within the namespace
    pub name: String,

    /// Prompt body
    pub text: String,

    /// Placeholder names the body expects to be interpolated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interpolation_values: Vec<String>,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// Free-form tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Authorship metadata
    #[serde(default)]
    pub meta: PromptMeta,

    /// Dotted version (`1.2.3`); only the encoded form reaches storage
    pub version: String,
}

/// Authorship metadata for a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
}

impl Prompt {
    /// Create a prompt with the fields every stored prompt needs.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            text: text.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Set the owning team.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    /// Add an author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.meta.authors.push(author.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The version lineage this prompt belongs to.
    pub fn reference(&self) -> Reference {
        Reference::new(&self.namespace, &self.name)
    }
}

/// Identifier of a prompt's version lineage: `"{namespace}#{name}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Separator between namespace and name.
    pub const SEPARATOR: char = '#';

    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{}{}{}", namespace, Self::SEPARATOR, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort key of a stored record: a concrete version or the `LATEST` alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionTag {
    Latest,
    Version(Version),
}

impl VersionTag {
    /// Interpret a version request: empty or `LATEST` selects the alias,
    /// anything else must parse as a version.
    pub fn parse_request(request: &str) -> StoreResult<Self> {
        if request.is_empty() || request == LATEST {
            Ok(VersionTag::Latest)
        } else {
            Ok(VersionTag::Version(Version::parse(request)?))
        }
    }

    /// The string stored in the `versioning` field.
    pub fn sort_key(&self) -> String {
        match self {
            VersionTag::Latest => LATEST.to_string(),
            VersionTag::Version(v) => v.encode(),
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTag::Latest => f.write_str(LATEST),
            VersionTag::Version(v) => write!(f, "{}", v),
        }
    }
}

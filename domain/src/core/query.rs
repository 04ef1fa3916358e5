//! Query value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The information need one discussion is held over.
///
/// Stored trimmed. Serializes as a bare string, and deserializing a blank
/// string fails, so a checkpoint can never hold an empty query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Query {
    content: String,
}

impl Query {
    /// # Panics
    /// Panics on blank content; use [`Query::parse`] for untrusted input.
    pub fn new(content: impl Into<String>) -> Self {
        match Self::parse(content) {
            Ok(query) => query,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn parse(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidQuery("query is blank".to_string()));
        }
        Ok(Self {
            content: if trimmed.len() == content.len() {
                content
            } else {
                trimmed.to_string()
            },
        })
    }

    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        Self::parse(content).ok()
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.content
    }
}

impl TryFrom<String> for Query {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

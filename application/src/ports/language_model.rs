//! Language model port
//!
//! The raw text-completion capability: one prompt in, one completion out.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a language model can fail with.
///
/// Only [`ModelError::Transient`] is retried by the generation gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Transport, timeout or rate-limit problem; worth retrying.
    #[error("Transient model error: {0}")]
    Transient(String),

    /// Anything else (bad request, auth, malformed response).
    #[error("Model error: {0}")]
    Fatal(String),
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

/// Text completion capability
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Turn a prompt into a completion.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    /// Name used in logs and transcripts.
    fn name(&self) -> &str {
        "model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ModelError::Transient("429".to_string()).is_transient());
        assert!(!ModelError::Fatal("400".to_string()).is_transient());
        assert_eq!(
            ModelError::Fatal("bad key".to_string()).to_string(),
            "Model error: bad key"
        );
    }
}

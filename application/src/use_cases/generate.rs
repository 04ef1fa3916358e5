//! Generation gateway
//!
//! Wraps a [`LanguageModel`] with two nested retry tiers:
//!
//! 1. **Transport**: transient model errors are retried up to
//!    `transport_attempts`; the last error (or any fatal one) is returned.
//! 2. **Semantic**: each completion goes through [`extract`] and the
//!    caller's validator. A rejected shape triggers a fresh completion from
//!    the same prompt, up to `semantic_attempts`, then `Ok(None)`.
//!
//! Transport failures surface as `Err`; shape failures never do.

use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event_type,
};
use crate::ports::language_model::{LanguageModel, ModelError};
use crate::use_cases::shared::check_cancelled;
use mods_domain::{FieldMap, RetryContext, SchemaError, extract, preview};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const PREVIEW_LEN: usize = 200;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }
}

/// Model access with transport and semantic retry. Cheap to clone.
#[derive(Clone)]
pub struct GenerationGateway {
    model: Arc<dyn LanguageModel>,
    transport_attempts: usize,
    semantic_attempts: usize,
    logger: Arc<dyn ConversationLogger>,
    cancellation: Option<CancellationToken>,
}

impl GenerationGateway {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            transport_attempts: 3,
            semantic_attempts: 5,
            logger: Arc::new(NoConversationLogger),
            cancellation: None,
        }
    }

    pub fn with_transport_attempts(mut self, attempts: usize) -> Self {
        self.transport_attempts = attempts;
        self
    }

    pub fn with_semantic_attempts(mut self, attempts: usize) -> Self {
        self.semantic_attempts = attempts;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn semantic_attempts(&self) -> usize {
        self.semantic_attempts
    }

    pub fn logger(&self) -> &Arc<dyn ConversationLogger> {
        &self.logger
    }

    pub fn cancellation(&self) -> &Option<CancellationToken> {
        &self.cancellation
    }

    /// Transport tier only: one completion, retrying transient errors.
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut retry = RetryContext::new(self.transport_attempts);
        loop {
            retry.next_attempt();
            check_cancelled(&self.cancellation)?;
            self.logger.log(ConversationEvent::new(
                event_type::PROMPT,
                json!({
                    "model": self.model.name(),
                    "attempt": retry.attempt(),
                    "prompt": prompt,
                }),
            ));

            match self.model.complete(prompt).await {
                Ok(text) => {
                    self.logger.log(ConversationEvent::new(
                        event_type::COMPLETION,
                        json!({
                            "model": self.model.name(),
                            "completion": text,
                        }),
                    ));
                    return Ok(text);
                }
                Err(error) if error.is_transient() && !retry.is_exhausted() => {
                    warn!(
                        "Transient model error (attempt {}/{}): {}",
                        retry.attempt(),
                        retry.max_attempts(),
                        error
                    );
                }
                Err(error) => return Err(error.into()),
            }
        }
    }

    /// Free-text generation: the completion is returned unparsed.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerationError> {
        self.complete(prompt).await
    }

    /// Extract `required` and accept whatever map passes the presence gate,
    /// including a partial last-resort map. Empty `required` yields the raw
    /// completion under the key `"text"`.
    pub async fn generate_fields<S: AsRef<str>>(
        &self,
        prompt: &str,
        required: &[S],
    ) -> Result<Option<FieldMap>, GenerationError> {
        if required.is_empty() {
            let text = self.generate_text(prompt).await?;
            let mut fields = FieldMap::new();
            fields.insert("text", serde_json::Value::String(text));
            return Ok(Some(fields));
        }
        self.generate(prompt, required, |fields| Ok(fields.clone()))
            .await
    }

    /// Semantic tier: generate until `validate` accepts the extracted
    /// fields. Returns `Ok(None)` once `semantic_attempts` completions have
    /// been rejected.
    pub async fn generate<S, T, F>(
        &self,
        prompt: &str,
        required: &[S],
        mut validate: F,
    ) -> Result<Option<T>, GenerationError>
    where
        S: AsRef<str>,
        F: FnMut(&FieldMap) -> Result<T, SchemaError>,
    {
        let mut retry = RetryContext::new(self.semantic_attempts);
        while retry.next_attempt() {
            check_cancelled(&self.cancellation)?;
            let raw = self.complete(prompt).await?;

            let reason = match extract(&raw, required) {
                Err(failure) => failure.to_string(),
                Ok(extraction) => {
                    if extraction.is_last_resort() {
                        debug!(
                            "Using line-pattern fallback ({} of {} fields found)",
                            extraction.fields.len(),
                            required.len()
                        );
                    }
                    match validate(&extraction.fields) {
                        Ok(value) => return Ok(Some(value)),
                        Err(error) => error.to_string(),
                    }
                }
            };

            warn!(
                "Completion rejected (attempt {}/{}): {}",
                retry.attempt(),
                retry.max_attempts(),
                reason
            );
            self.logger.log(ConversationEvent::new(
                event_type::CONTRACT_RETRY,
                json!({
                    "attempt": retry.attempt(),
                    "max_attempts": retry.max_attempts(),
                    "reason": reason,
                    "completion": preview(&raw, PREVIEW_LEN),
                }),
            ));
        }

        warn!(
            "No usable completion after {} attempts",
            retry.max_attempts()
        );
        Ok(None)
    }
}

//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application
//! parameters with [`FileConfig::discussion_params`] and
//! [`FileConfig::retry_limits`].

mod discussion;
mod model;
mod output;
mod retry;
mod run;

pub use discussion::{FileDiscussionConfig, FileVariantConfig};
pub use model::FileModelConfig;
pub use output::FileOutputConfig;
pub use retry::FileRetryConfig;
pub use run::{FileDatasetConfig, FileRunConfig};

use mods_application::{DiscussionParams, RetryLimits};
use mods_domain::TokenBudget;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration value that cannot run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("{field} must be at least 1")]
    ZeroValue { field: &'static str },

    #[error("discussion.variants cannot be empty")]
    NoVariants,

    #[error("model.model cannot be empty")]
    EmptyModelName,

    #[error("model.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("{0}")]
    TokenBudget(String),

    #[error("dataset '{name}' is listed more than once")]
    DuplicateDataset { name: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Discussion shape
    pub discussion: FileDiscussionConfig,
    /// Attempt ceilings and checkpoint cadence
    pub retry: FileRetryConfig,
    /// Completion endpoint
    pub model: FileModelConfig,
    /// Run name, datasets and result paths
    pub run: FileRunConfig,
    /// Terminal output
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        let counts = [
            ("discussion.top_k", self.discussion.top_k),
            ("discussion.topic_count", self.discussion.topic_count),
            ("retry.transport_attempts", self.retry.transport_attempts),
            ("retry.semantic_attempts", self.retry.semantic_attempts),
            ("retry.selection_attempts", self.retry.selection_attempts),
            ("retry.session_attempts", self.retry.session_attempts),
        ];
        issues.extend(
            counts
                .into_iter()
                .filter(|(_, value)| *value == 0)
                .map(|(field, _)| ConfigValidationError::ZeroValue { field }),
        );

        if self.discussion.variants.is_empty() {
            issues.push(ConfigValidationError::NoVariants);
        }
        if self.model.model.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.model.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }
        issues.extend(
            TokenBudget::new(self.model.token_limit)
                .validate()
                .into_iter()
                .map(ConfigValidationError::TokenBudget),
        );

        let mut seen = std::collections::HashSet::new();
        for dataset in &self.run.datasets {
            if !seen.insert(dataset.name.as_str()) {
                issues.push(ConfigValidationError::DuplicateDataset {
                    name: dataset.name.clone(),
                });
            }
        }

        issues
    }

    pub fn discussion_params(&self) -> DiscussionParams {
        let d = &self.discussion;
        DiscussionParams::default()
            .with_top_k(d.top_k)
            .with_topic_count(d.topic_count)
            .with_subtopic_retrieval(d.use_subtopic_retrieval)
            .with_select_agents(d.select_agents)
            .with_selection_detail(d.selection_detail)
            .with_parallel_speakers(d.parallel_speakers)
            .with_variants(d.variant_keys())
            .with_token_budget(TokenBudget::new(self.model.token_limit))
    }

    pub fn retry_limits(&self) -> RetryLimits {
        RetryLimits {
            transport_attempts: self.retry.transport_attempts,
            semantic_attempts: self.retry.semantic_attempts,
            selection_attempts: self.retry.selection_attempts,
            session_attempts: self.retry.session_attempts,
            checkpoint_every: self.retry.checkpoint_every,
        }
    }
}

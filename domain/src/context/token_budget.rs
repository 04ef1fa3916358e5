//! Token budget for document context.
//!
//! [`TokenBudget`] bounds how much of a document is placed in a single
//! prompt. Counting goes through a [`TokenEstimator`]; the default
//! [`CharCountEstimator`] charges one token per four characters, rounded
//! up, and needs no tokenizer.
//!
//! # Pruning policy
//!
//! Passages are taken in order while the running total has not yet gone
//! over the limit. The passage that crosses the limit is still kept; every
//! passage after it is dropped. Dropping is silent and deterministic.

use serde::{Deserialize, Serialize};

/// Default limit, sized for a 128k-context chat model.
pub const DEFAULT_TOKEN_LIMIT: usize = 127_000;

/// Pluggable token counting.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}

/// `ceil(chars / 4)`
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCountEstimator;

impl TokenEstimator for CharCountEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

/// Estimated token count of `text` under the default estimator.
pub fn estimate_tokens(text: &str) -> usize {
    CharCountEstimator.estimate(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBudget {
    token_limit: usize,
}

impl TokenBudget {
    pub fn new(token_limit: usize) -> Self {
        Self { token_limit }
    }

    pub fn unlimited() -> Self {
        Self {
            token_limit: usize::MAX,
        }
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Leading passages that fit the budget (see module docs).
    pub fn prune<'a, S: AsRef<str>>(&self, passages: &'a [S]) -> &'a [S] {
        self.prune_with(&CharCountEstimator, passages)
    }

    pub fn prune_with<'a, S: AsRef<str>>(
        &self,
        estimator: &dyn TokenEstimator,
        passages: &'a [S],
    ) -> &'a [S] {
        let mut total = 0usize;
        for (kept, passage) in passages.iter().enumerate() {
            if total > self.token_limit {
                return &passages[..kept];
            }
            total = total.saturating_add(estimator.estimate(passage.as_ref()));
        }
        passages
    }

    /// Pruned passages joined one per line.
    pub fn pruned_text<S: AsRef<str>>(&self, passages: &[S]) -> String {
        self.prune(passages)
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.token_limit == 0 {
            issues.push("model: token_limit must be > 0".to_string());
        }
        issues
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LIMIT)
    }
}

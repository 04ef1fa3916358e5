//! Discussion parameters: what a session does.
//!
//! [`DiscussionParams`] groups the knobs that shape one discussion: how
//! much is retrieved, how many topics are planned, whether the moderator
//! picks speakers, and which variants run from the shared plan.

use mods_domain::{RunSettings, SelectionDetail, TokenBudget, VariantKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionParams {
    /// Passages retrieved per document.
    pub top_k: usize,
    /// Discussion points planned per query.
    pub topic_count: usize,
    /// Retrieve selection context with the topic rather than the query.
    pub use_subtopic_retrieval: bool,
    /// Let the moderator choose speakers; otherwise every document speaks.
    pub select_agents: bool,
    /// Detail requested per selected speaker in variants with `use_cot`.
    pub selection_detail: SelectionDetail,
    /// Elicit a topic's speakers concurrently. Fact order is unchanged.
    pub parallel_speakers: bool,
    /// Variants run from each item's shared plan, in order.
    pub variants: Vec<VariantKey>,
    /// Budget for whole-document speaker context.
    pub token_budget: TokenBudget,
}

impl Default for DiscussionParams {
    fn default() -> Self {
        Self {
            top_k: 3,
            topic_count: 3,
            use_subtopic_retrieval: true,
            select_agents: true,
            selection_detail: SelectionDetail::Question,
            parallel_speakers: false,
            variants: vec![VariantKey::default()],
            token_budget: TokenBudget::default(),
        }
    }
}

impl DiscussionParams {
    // ==================== Builder Methods ====================

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_topic_count(mut self, count: usize) -> Self {
        self.topic_count = count;
        self
    }

    pub fn with_subtopic_retrieval(mut self, enabled: bool) -> Self {
        self.use_subtopic_retrieval = enabled;
        self
    }

    pub fn with_select_agents(mut self, enabled: bool) -> Self {
        self.select_agents = enabled;
        self
    }

    pub fn with_selection_detail(mut self, detail: SelectionDetail) -> Self {
        self.selection_detail = detail;
        self
    }

    pub fn with_parallel_speakers(mut self, enabled: bool) -> Self {
        self.parallel_speakers = enabled;
        self
    }

    pub fn with_variants(mut self, variants: Vec<VariantKey>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_token_budget(mut self, budget: TokenBudget) -> Self {
        self.token_budget = budget;
        self
    }

    /// Detail the moderator is asked for in `variant`.
    pub fn detail_for(&self, variant: VariantKey) -> SelectionDetail {
        if variant.use_cot {
            self.selection_detail
        } else {
            SelectionDetail::None
        }
    }

    /// The settings every record of a checkpoint must share. Variants and
    /// speaker concurrency are left out: the former key the records, the
    /// latter does not change them.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            top_k: self.top_k,
            topic_count: self.topic_count,
            use_subtopic_retrieval: self.use_subtopic_retrieval,
            select_agents: self.select_agents,
            selection_detail: self.selection_detail,
            token_limit: self.token_budget.token_limit(),
        }
    }
}

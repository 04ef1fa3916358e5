//! Per-item session results and the checkpoint bundle that collects them.

use super::assignment::SelectionDetail;
use super::state::DiscussionState;
use super::topic::DiscussionPoint;
use super::variant::VariantKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of one dataset item for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionRecord {
    Completed { state: DiscussionState },
    /// Every session attempt failed; `message` is the last error.
    Failed { message: String },
}

impl SessionRecord {
    pub fn completed(state: DiscussionState) -> Self {
        SessionRecord::Completed { state }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        SessionRecord::Failed {
            message: message.into(),
        }
    }

    pub fn state(&self) -> Option<&DiscussionState> {
        match self {
            SessionRecord::Completed { state } => Some(state),
            SessionRecord::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SessionRecord::Failed { .. })
    }
}

/// Discussion settings shared by every record of a bundle. Records made
/// under different settings are not comparable, so a bundle only ever
/// holds one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub top_k: usize,
    pub topic_count: usize,
    pub use_subtopic_retrieval: bool,
    pub select_agents: bool,
    pub selection_detail: SelectionDetail,
    pub token_limit: usize,
}

impl fmt::Display for RunSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top_k={} topics={} subtopic_retrieval={} select_agents={} detail={} token_limit={}",
            self.top_k,
            self.topic_count,
            self.use_subtopic_retrieval,
            self.select_agents,
            self.selection_detail.as_str(),
            self.token_limit
        )
    }
}

/// Everything a run has produced so far:
/// `variants[variant key][dataset name] = [record per item]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckpointBundle {
    pub run_name: String,
    /// Absent in bundles written before settings were recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<RunSettings>,
    #[serde(default)]
    pub variants: BTreeMap<String, BTreeMap<String, Vec<SessionRecord>>>,
}

impl CheckpointBundle {
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            settings: None,
            variants: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn records(&self, variant: VariantKey, dataset: &str) -> &[SessionRecord] {
        self.variants
            .get(&variant.to_string())
            .and_then(|datasets| datasets.get(dataset))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of leading items of `dataset` recorded for every variant.
    pub fn completed_items(&self, variants: &[VariantKey], dataset: &str) -> usize {
        variants
            .iter()
            .map(|v| self.records(*v, dataset).len())
            .min()
            .unwrap_or(0)
    }

    pub fn append(&mut self, variant: VariantKey, dataset: &str, record: SessionRecord) {
        self.variants
            .entry(variant.to_string())
            .or_default()
            .entry(dataset.to_string())
            .or_default()
            .push(record);
    }

    /// Variants with no record yet for item `index` of `dataset`.
    pub fn missing_variants(
        &self,
        variants: &[VariantKey],
        dataset: &str,
        index: usize,
    ) -> Vec<VariantKey> {
        variants
            .iter()
            .filter(|v| self.records(**v, dataset).len() <= index)
            .copied()
            .collect()
    }

    /// Topics of a completed record of item `index`, if any variant has
    /// one. Variants added later reuse this plan.
    pub fn planned_topics(
        &self,
        variants: &[VariantKey],
        dataset: &str,
        index: usize,
    ) -> Option<Vec<DiscussionPoint>> {
        variants.iter().find_map(|v| {
            self.records(*v, dataset)
                .get(index)
                .and_then(SessionRecord::state)
                .map(|state| state.topics().cloned().collect())
        })
    }

    pub fn failure_count(&self) -> usize {
        self.variants
            .values()
            .flat_map(|datasets| datasets.values())
            .flatten()
            .filter(|r| r.is_failed())
            .count()
    }
}

//! Discussion configuration from TOML (`[discussion]` section)

use mods_domain::{SelectionDetail, VariantKey};
use serde::{Deserialize, Serialize};

/// One variant as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVariantConfig {
    pub use_cot: bool,
    pub use_rationale: bool,
}

impl From<FileVariantConfig> for VariantKey {
    fn from(v: FileVariantConfig) -> Self {
        VariantKey::new(v.use_cot, v.use_rationale)
    }
}

/// Raw discussion configuration from TOML.
///
/// # Example
///
/// ```toml
/// [discussion]
/// top_k = 5
/// topic_count = 4
/// selection_detail = "rationale"
/// variants = [
///     { use_cot = false, use_rationale = false },
///     { use_cot = true, use_rationale = true },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub top_k: usize,
    pub topic_count: usize,
    pub use_subtopic_retrieval: bool,
    pub select_agents: bool,
    pub selection_detail: SelectionDetail,
    pub parallel_speakers: bool,
    pub variants: Vec<FileVariantConfig>,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            topic_count: 3,
            use_subtopic_retrieval: true,
            select_agents: true,
            selection_detail: SelectionDetail::Question,
            parallel_speakers: false,
            variants: vec![FileVariantConfig::default()],
        }
    }
}

impl FileDiscussionConfig {
    pub fn variant_keys(&self) -> Vec<VariantKey> {
        self.variants.iter().copied().map(VariantKey::from).collect()
    }
}

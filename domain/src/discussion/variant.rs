//! Experiment variants run from one shared plan.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which optional reasoning steps a variant enables.
///
/// - `use_cot`: the moderator attaches a per-document detail (rationale or
///   sub-question) to every speaker it selects
/// - `use_rationale`: a speaker retrieves with its moderator-supplied
///   sub-question instead of the topic label
///
/// The string form `cot-<bool>_rationale-<bool>` keys checkpoint bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VariantKey {
    pub use_cot: bool,
    pub use_rationale: bool,
}

impl VariantKey {
    pub fn new(use_cot: bool, use_rationale: bool) -> Self {
        Self {
            use_cot,
            use_rationale,
        }
    }

    /// Pair up two flag lists element-wise. The shorter list bounds the
    /// result.
    pub fn zip(cot: &[bool], rationale: &[bool]) -> Vec<VariantKey> {
        cot.iter()
            .zip(rationale)
            .map(|(&c, &r)| VariantKey::new(c, r))
            .collect()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cot-{}_rationale-{}", self.use_cot, self.use_rationale)
    }
}

impl std::str::FromStr for VariantKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid variant key '{}'", s);
        let (cot, rationale) = s.split_once('_').ok_or_else(invalid)?;
        let use_cot = cot
            .strip_prefix("cot-")
            .and_then(|v| v.parse().ok())
            .ok_or_else(invalid)?;
        let use_rationale = rationale
            .strip_prefix("rationale-")
            .and_then(|v| v.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(use_cot, use_rationale))
    }
}

impl From<VariantKey> for String {
    fn from(key: VariantKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for VariantKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

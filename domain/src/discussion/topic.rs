//! Discussion point value object

use serde::{Deserialize, Serialize};

/// A short label naming one sub-question of the query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscussionPoint(String);

impl DiscussionPoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiscussionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DiscussionPoint {
    fn from(s: &str) -> Self {
        DiscussionPoint::new(s)
    }
}

/// Labels that occur more than once (case-insensitive), in first-seen
/// order. Planning never drops them; this only reports.
pub fn duplicate_labels(points: &[DiscussionPoint]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();
    for point in points {
        let key = point.label().to_lowercase();
        if seen.contains(&key) {
            if !duplicates.contains(&key) {
                duplicates.push(key);
            }
        } else {
            seen.push(key);
        }
    }
    duplicates
}

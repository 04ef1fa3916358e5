//! Retry ceilings for every recovery tier.

use serde::{Deserialize, Serialize};

/// Attempt bounds, innermost first.
///
/// | Tier | Field | Recovers from |
/// |------|-------|---------------|
/// | transport | `transport_attempts` | transient model errors |
/// | semantic | `semantic_attempts` | completions that break the output contract |
/// | selection | `selection_attempts` | selections missing a per-document detail |
/// | session | `session_attempts` | any other failure inside one item |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryLimits {
    pub transport_attempts: usize,
    pub semantic_attempts: usize,
    pub selection_attempts: usize,
    pub session_attempts: usize,
    /// Save a checkpoint after every this many items (0 disables periodic
    /// saves; the end-of-dataset save always happens).
    pub checkpoint_every: usize,
}

impl Default for RetryLimits {
    fn default() -> Self {
        Self {
            transport_attempts: 3,
            semantic_attempts: 5,
            selection_attempts: 5,
            session_attempts: 5,
            checkpoint_every: 10,
        }
    }
}

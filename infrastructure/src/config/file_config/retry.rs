//! Retry configuration from TOML (`[retry]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub transport_attempts: usize,
    pub semantic_attempts: usize,
    pub selection_attempts: usize,
    pub session_attempts: usize,
    /// Items between checkpoint saves (0 = only at the end of each dataset).
    pub checkpoint_every: usize,
}

impl Default for FileRetryConfig {
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

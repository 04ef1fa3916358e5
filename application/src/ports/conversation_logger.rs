//! Transcript port
//!
//! Every prompt, completion and retry of a run can be recorded as a
//! [`ConversationEvent`]. `tracing` output is for people watching a run;
//! the transcript is for replaying what the model was asked and said.

use serde_json::Value;

/// Event type identifiers.
pub mod event_type {
    pub const PROMPT: &str = "prompt";
    pub const COMPLETION: &str = "completion";
    pub const CONTRACT_RETRY: &str = "contract_retry";
    pub const SELECTION_RETRY: &str = "selection_retry";
    pub const SESSION_RETRY: &str = "session_retry";
    pub const CHECKPOINT: &str = "checkpoint";
}

/// One transcript entry. Adapters add the timestamp.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// One of the [`event_type`] constants.
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for transcript entries. `log` cannot fail: adapters report their
/// own write errors through `tracing` and carry on.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Used when no transcript is configured.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

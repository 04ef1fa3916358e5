//! Progress notification port
//!
//! Defines the interface for reporting progress while a batch of
//! discussions runs. Every callback has a no-op default so reporters only
//! implement what they display.

use mods_domain::{DiscussionPoint, VariantKey};

/// Callback for progress updates during a batch run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain logs, nothing).
pub trait DiscussionProgress: Send + Sync {
    // ==================== Batch Callbacks ====================

    /// A dataset starts; `skipped` items were already checkpointed.
    fn on_dataset_start(&self, _dataset: &str, _total: usize, _skipped: usize) {}

    fn on_item_start(&self, _dataset: &str, _index: usize) {}

    fn on_item_complete(&self, _dataset: &str, _index: usize, _failed: bool) {}

    fn on_dataset_complete(&self, _dataset: &str) {}

    /// A checkpoint was written holding `items` items of the dataset.
    fn on_checkpoint(&self, _location: &str, _items: usize) {}

    // ==================== Session Callbacks ====================

    fn on_topics_planned(&self, _topics: &[DiscussionPoint]) {}

    fn on_topic_start(&self, _variant: VariantKey, _index: usize, _topic: &DiscussionPoint) {}

    /// Speakers are known for the current topic.
    fn on_speakers_selected(&self, _index: usize, _speakers: usize) {}

    fn on_speaker_complete(&self, _index: usize, _document: usize, _facts: usize) {}

    /// A session attempt failed and the session restarts from planning.
    fn on_session_retry(&self, _attempt: usize, _max_attempts: usize, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl DiscussionProgress for NoProgress {}

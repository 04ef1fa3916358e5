//! Discussion outline: topics, speaker assignments and attributed facts.
//!
//! [`DiscussionState`] is the single owner of a session's outline. Variants
//! of one item start from a `clone()` of the planned state and diverge from
//! there; [`SessionRecord`] and [`CheckpointBundle`] carry the results to
//! disk.

pub mod assignment;
pub mod fact;
pub mod record;
pub mod state;
pub mod topic;
pub mod variant;

pub use assignment::{SelectionDetail, SpeakerAssignment, SpeakerEntry};
pub use fact::{Fact, Stance, split_citation};
pub use record::{CheckpointBundle, RunSettings, SessionRecord};
pub use state::{DiscussionState, TopicEntry};
pub use topic::{DiscussionPoint, duplicate_labels};
pub use variant::VariantKey;

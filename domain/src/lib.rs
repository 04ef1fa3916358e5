//! Domain layer for mods
//!
//! This crate contains the core logic of a multi-document discussion: the
//! output contract that turns free text into typed results, the discussion
//! state that accumulates an outline, and the prompts that drive both.
//! It has no dependencies on infrastructure or presentation concerns, and
//! performs no I/O.
//!
//! # Core Concepts
//!
//! ## Discussion
//!
//! A *moderator* plans a handful of discussion points for a query, then for
//! each point selects which documents (*speakers*) should contribute. Each
//! selected speaker reports supporting and opposing facts drawn from its
//! own document. The result is an outline: topics, speaker assignments and
//! attributed facts ([`DiscussionState`]).
//!
//! ## Output contract
//!
//! Every model request declares the fields it needs. [`contract::extract`]
//! recovers them from whatever the model wrote, and the typed schemas in
//! [`contract::schema`] reject maps that are the wrong shape.

pub mod context;
pub mod contract;
pub mod core;
pub mod discussion;
pub mod prompt;
pub mod retry;

// Re-export commonly used types
pub use context::{
    CharCountEstimator, TokenBudget, TokenEstimator, estimate_tokens, join_passages,
    render_documents,
};
pub use contract::{
    Abstention, Extraction, ExtractionFailure, ExtractionStrategy, FactReport, FieldMap,
    RouteDecision, RouteLabel, SchemaError, SelectionResult, TopicPlan, TopicProposal, extract,
};
pub use core::{document::Document, error::DomainError, query::Query, string::preview};
pub use discussion::{
    CheckpointBundle, DiscussionPoint, DiscussionState, Fact, RunSettings, SelectionDetail,
    SessionRecord, SpeakerAssignment, SpeakerEntry, Stance, TopicEntry, VariantKey,
};
pub use prompt::{ModeratorPrompt, SpeakerPrompt};
pub use retry::RetryContext;

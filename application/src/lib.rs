//! Application layer for mods
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DiscussionParams, RetryLimits};
pub use ports::{
    checkpoint::{CheckpointError, CheckpointStore},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    dataset::{Dataset, DatasetError, DatasetItem},
    language_model::{LanguageModel, ModelError},
    progress::{DiscussionProgress, NoProgress},
    retriever::{
        CandidateSet, DocumentCandidates, RetrievalError, Retriever, RetrieverFactory,
    },
};
pub use use_cases::generate::{GenerationError, GenerationGateway};
pub use use_cases::moderator::{Moderator, Routing, SelectionOutcome};
pub use use_cases::run_batch::{BatchSummary, RunBatchError, RunBatchInput, RunBatchUseCase};
pub use use_cases::run_session::{DiscussionError, RunSessionUseCase};
pub use use_cases::speaker::{Speaker, elicit_with_citations};

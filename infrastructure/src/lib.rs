//! Infrastructure layer for mods
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod checkpoint;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod providers;
pub mod retrieval;

// Re-export commonly used types
pub use checkpoint::JsonCheckpointStore;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileDatasetConfig, FileDiscussionConfig,
    FileModelConfig, FileOutputConfig, FileRetryConfig, FileRunConfig, FileVariantConfig,
};
pub use dataset::JsonDataset;
pub use logging::JsonlConversationLogger;
pub use providers::OpenAiCompatibleModel;
pub use retrieval::{LexicalRetriever, LexicalRetrieverFactory};

//! Checkpoint port
//!
//! Durable storage for the run's [`CheckpointBundle`]. Saves must be atomic:
//! a crash mid-save leaves the previous bundle intact.

use async_trait::async_trait;
use mods_domain::CheckpointBundle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint at {path} is not valid: {message}")]
    Corrupt { path: String, message: String },
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the saved bundle, or `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<CheckpointBundle>, CheckpointError>;

    /// Atomically replace the saved bundle.
    async fn save(&self, bundle: &CheckpointBundle) -> Result<(), CheckpointError>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

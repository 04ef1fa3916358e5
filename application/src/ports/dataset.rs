//! Dataset port
//!
//! A named, indexable collection of (query, documents) items.

use mods_domain::{Document, Query};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse dataset {path} (record {record}): {message}")]
    Parse {
        path: String,
        record: usize,
        message: String,
    },

    #[error("Item {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },
}

/// One unit of work: a query and the documents it is discussed over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    pub query: Query,
    pub documents: Vec<Document>,
}

impl DatasetItem {
    pub fn new(query: Query, documents: Vec<Document>) -> Self {
        Self { query, documents }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

pub trait Dataset: Send + Sync {
    /// Name used as the dataset key in checkpoints.
    fn name(&self) -> &str;

    fn item_count(&self) -> usize;

    fn get_item(&self, index: usize) -> Result<DatasetItem, DatasetError>;
}

//! Retriever port
//!
//! Ranks the passages of the session's documents against a query. A
//! retriever is built once per dataset item and treated as a pure function
//! of (documents, query).

use async_trait::async_trait;
use mods_domain::{Document, render_documents};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error("Document {document} does not exist ({count} documents)")]
    DocumentOutOfRange { document: usize, count: usize },

    #[error("Retriever error: {0}")]
    Backend(String),
}

/// Best passages of one document for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCandidates {
    /// Zero-based document index.
    pub document: usize,
    /// Passages in descending relevance.
    pub passages: Vec<String>,
    /// Relevance of the best passage.
    pub score: f64,
}

/// Per-document ranked passages, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub documents: Vec<DocumentCandidates>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// `Document N: ...` context block for moderator prompts.
    pub fn render(&self) -> String {
        render_documents(
            self.documents
                .iter()
                .map(|c| (c.document, c.passages.as_slice())),
        )
    }
}

#[async_trait]
pub trait Retriever: Send + Sync {
    fn document_count(&self) -> usize;

    /// Top `k` passages of one document for `query`, most relevant first.
    async fn top_passages(
        &self,
        document: usize,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError>;

    /// Top `k` passages of every document, with the best passage's score.
    async fn best_candidates(&self, query: &str, k: usize) -> Result<CandidateSet, RetrievalError>;
}

/// Builds a retriever over one item's documents.
pub trait RetrieverFactory: Send + Sync {
    fn build(&self, documents: &[Document]) -> Result<Arc<dyn Retriever>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_candidates() {
        let set = CandidateSet {
            documents: vec![
                DocumentCandidates {
                    document: 0,
                    passages: vec!["a".to_string(), "b".to_string()],
                    score: 1.0,
                },
                DocumentCandidates {
                    document: 1,
                    passages: vec!["c".to_string()],
                    score: 0.5,
                },
            ],
        };
        assert_eq!(set.render(), "Document 1: a b\nDocument 2: c");
        assert_eq!(set.len(), 2);
    }
}

//! Document entity

use serde::{Deserialize, Serialize};

/// One source document taking part in a discussion.
///
/// `index` is zero-based and stable for the session; user-facing
/// citations use [`Document::citation_number`] (one-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    index: usize,
    passages: Vec<String>,
}

impl Document {
    pub fn new(index: usize, passages: Vec<String>) -> Self {
        Self { index, passages }
    }

    /// Build the documents of a dataset item, numbering them in order.
    pub fn collection(passage_lists: Vec<Vec<String>>) -> Vec<Document> {
        passage_lists
            .into_iter()
            .enumerate()
            .map(|(index, passages)| Document::new(index, passages))
            .collect()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// One-based number used in prompts and outlines.
    pub fn citation_number(&self) -> usize {
        self.index + 1
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_numbers_documents() {
        let docs = Document::collection(vec![
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string()],
        ]);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].index(), 1);
        assert_eq!(docs[1].citation_number(), 2);
        assert_eq!(docs[1].passages().len(), 2);
    }
}

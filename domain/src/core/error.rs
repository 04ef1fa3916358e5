//! Domain error types

use thiserror::Error;

/// Domain-level errors raised when an operation would break the
/// discussion state's shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Topics have already been planned for this discussion")]
    TopicsAlreadyPlanned,

    #[error("Topic index {index} out of range ({len} topics)")]
    TopicOutOfRange { index: usize, len: usize },

    #[error("Speakers for topic {topic} have already been selected")]
    SelectionAlreadyRecorded { topic: usize },

    #[error("No speaker selection recorded for topic {topic}")]
    SelectionMissing { topic: usize },

    #[error("Document {document} was not assigned to topic {topic}")]
    UnassignedSpeaker { topic: usize, document: usize },

    #[error("Fact has no citation marker: {0}")]
    MissingCitation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::UnassignedSpeaker {
            topic: 2,
            document: 4,
        };
        assert_eq!(error.to_string(), "Document 4 was not assigned to topic 2");

        let error = DomainError::TopicOutOfRange { index: 5, len: 3 };
        assert_eq!(error.to_string(), "Topic index 5 out of range (3 topics)");
    }
}

//! Speaker assignments: which documents speak on a topic.

use crate::contract::SelectionResult;
use serde::{Deserialize, Serialize};

/// Per-document detail the moderator is asked to attach to a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionDetail {
    /// Only the relevant-document list.
    #[default]
    None,
    /// A justification of why each document should speak.
    Rationale,
    /// A short sub-question each document is expert in.
    Question,
}

impl SelectionDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionDetail::None => "none",
            SelectionDetail::Rationale => "rationale",
            SelectionDetail::Question => "question",
        }
    }

    /// Suffix of the `document N <suffix>` field, if a detail is requested.
    pub fn key_suffix(&self) -> Option<&'static str> {
        match self {
            SelectionDetail::None => None,
            SelectionDetail::Rationale => Some("rationale"),
            SelectionDetail::Question => Some("question"),
        }
    }
}

impl std::str::FromStr for SelectionDetail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(SelectionDetail::None),
            "rationale" => Ok(SelectionDetail::Rationale),
            "question" => Ok(SelectionDetail::Question),
            other => Err(format!(
                "unknown selection detail '{}' (expected none, rationale or question)",
                other
            )),
        }
    }
}

/// One selected speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerEntry {
    pub document: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// The moderator's decision for one topic, in speaking order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerAssignment {
    detail: SelectionDetail,
    speakers: Vec<SpeakerEntry>,
}

impl SpeakerAssignment {
    /// Build from a validated selection. Every relevant document carries
    /// its detail when one was requested; [`SelectionResult::with_details`]
    /// guarantees that.
    pub fn from_selection(selection: SelectionResult, detail: SelectionDetail) -> Self {
        let SelectionResult {
            relevant,
            mut details,
        } = selection;
        let speakers = relevant
            .into_iter()
            .map(|document| SpeakerEntry {
                document,
                detail: details.remove(&document),
            })
            .collect();
        Self { detail, speakers }
    }

    /// Every document speaks, without detail. Used when selection is off.
    pub fn everyone(document_count: usize) -> Self {
        Self {
            detail: SelectionDetail::None,
            speakers: (0..document_count)
                .map(|document| SpeakerEntry {
                    document,
                    detail: None,
                })
                .collect(),
        }
    }

    pub fn detail_kind(&self) -> SelectionDetail {
        self.detail
    }

    pub fn speakers(&self) -> &[SpeakerEntry] {
        &self.speakers
    }

    pub fn documents(&self) -> impl Iterator<Item = usize> + '_ {
        self.speakers.iter().map(|s| s.document)
    }

    pub fn contains(&self, document: usize) -> bool {
        self.speakers.iter().any(|s| s.document == document)
    }

    pub fn detail_for(&self, document: usize) -> Option<&str> {
        self.speakers
            .iter()
            .find(|s| s.document == document)
            .and_then(|s| s.detail.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }
}

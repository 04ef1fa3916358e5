//! Typed schemas validated from a [`FieldMap`].
//!
//! Each operation that talks to the model declares the fields it needs and
//! converts the extracted map into one of these types at the boundary, so
//! nothing past the gateway handles untyped maps.

use super::field::FieldMap;
use crate::discussion::assignment::SelectionDetail;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Why a field map could not be turned into a typed result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Missing field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' is malformed: {reason}")]
    Malformed { field: String, reason: String },

    #[error("Document {number} is not one of the {count} candidate documents")]
    DocumentOutOfRange { number: usize, count: usize },

    #[error("No {kind} given for document {number}")]
    MissingDetail { kind: &'static str, number: usize },
}

impl SchemaError {
    /// True for errors that mean "the relevant documents are known but a
    /// per-document detail is absent".
    pub fn is_incomplete_selection(&self) -> bool {
        matches!(self, SchemaError::MissingDetail { .. })
    }
}

fn text_field(fields: &FieldMap, name: &str) -> Result<String, SchemaError> {
    fields
        .get_text(name)
        .ok_or_else(|| SchemaError::MissingField(name.to_string()))
}

fn list_field(fields: &FieldMap, name: &str) -> Result<Vec<String>, SchemaError> {
    if !fields.contains(name) {
        return Err(SchemaError::MissingField(name.to_string()));
    }
    fields.get_list(name).ok_or_else(|| SchemaError::Malformed {
        field: name.to_string(),
        reason: "expected a list".to_string(),
    })
}

// ==================== Topic planning ====================

/// Ordered topic labels keyed `discussion point 1..=N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPlan {
    pub topics: Vec<String>,
}

impl TopicPlan {
    pub fn field_names(count: usize) -> Vec<String> {
        (1..=count).map(|n| format!("discussion point {}", n)).collect()
    }

    /// Topics in key-number order, exactly `count` of them.
    pub fn from_fields(fields: &FieldMap, count: usize) -> Result<Self, SchemaError> {
        let topics = Self::field_names(count)
            .iter()
            .map(|name| text_field(fields, name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { topics })
    }
}

/// Open-ended topic proposal: three central points plus optional extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicProposal {
    pub important: Vec<String>,
    pub other: Vec<String>,
}

impl TopicProposal {
    pub const IMPORTANT_POINTS: &'static str = "important points";
    pub const OTHER_POINTS: &'static str = "other points";

    pub fn from_fields(fields: &FieldMap) -> Result<Self, SchemaError> {
        let important = list_field(fields, Self::IMPORTANT_POINTS)?;
        let other = fields.get_list(Self::OTHER_POINTS).unwrap_or_default();
        Ok(Self { important, other })
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.important.iter().chain(self.other.iter())
    }
}

// ==================== Speaker selection ====================

/// Moderator's speaker selection for one topic.
///
/// `relevant` holds zero-based document indices in the order the model
/// listed them; `details` maps each of them to its rationale or
/// sub-question when one was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    pub relevant: Vec<usize>,
    pub details: BTreeMap<usize, String>,
}

impl SelectionResult {
    pub const RELEVANT_DOCUMENTS: &'static str = "relevant documents";

    /// Key holding the detail for a one-based document number.
    pub fn detail_field(detail: SelectionDetail, number: usize) -> Option<String> {
        detail
            .key_suffix()
            .map(|suffix| format!("document {} {}", number, suffix))
    }

    /// First tier: the relevant-document list, converted from the model's
    /// one-based numbers, deduplicated in order and range checked.
    pub fn relevant_from_fields(
        fields: &FieldMap,
        document_count: usize,
    ) -> Result<Vec<usize>, SchemaError> {
        let entries = list_field(fields, Self::RELEVANT_DOCUMENTS)?;
        let mut relevant = Vec::new();
        for entry in entries {
            let Some(number) = DIGITS
                .find(&entry)
                .and_then(|m| m.as_str().parse::<usize>().ok())
            else {
                return Err(SchemaError::Malformed {
                    field: Self::RELEVANT_DOCUMENTS.to_string(),
                    reason: format!("'{}' is not a document number", entry),
                });
            };
            if number == 0 || number > document_count {
                return Err(SchemaError::DocumentOutOfRange {
                    number,
                    count: document_count,
                });
            }
            if !relevant.contains(&(number - 1)) {
                relevant.push(number - 1);
            }
        }
        Ok(relevant)
    }

    /// Second tier: every relevant document must carry its detail field in
    /// the same map. Any gap rejects the whole selection.
    pub fn with_details(
        relevant: Vec<usize>,
        fields: &FieldMap,
        detail: SelectionDetail,
    ) -> Result<Self, SchemaError> {
        let mut details = BTreeMap::new();
        for &index in &relevant {
            let Some(key) = Self::detail_field(detail, index + 1) else {
                continue;
            };
            match fields.get_text(&key) {
                Some(text) if !text.trim().is_empty() => {
                    details.insert(index, text);
                }
                _ => {
                    return Err(SchemaError::MissingDetail {
                        kind: detail.as_str(),
                        number: index + 1,
                    });
                }
            }
        }
        Ok(Self { relevant, details })
    }

    pub fn detail_for(&self, document: usize) -> Option<&str> {
        self.details.get(&document).map(String::as_str)
    }
}

// ==================== Speaker facts ====================

/// A speaker's two disjoint fact lists for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactReport {
    pub topic: String,
    pub supporting: Vec<String>,
    pub opposing: Vec<String>,
}

impl FactReport {
    pub const DISCUSSION_POINT: &'static str = "discussion point";
    pub const YES_FACTS: &'static str = "yes facts";
    pub const NO_FACTS: &'static str = "no facts";

    pub fn field_names() -> [&'static str; 3] {
        [Self::DISCUSSION_POINT, Self::YES_FACTS, Self::NO_FACTS]
    }

    pub fn from_fields(fields: &FieldMap) -> Result<Self, SchemaError> {
        Ok(Self {
            topic: text_field(fields, Self::DISCUSSION_POINT)?,
            supporting: list_field(fields, Self::YES_FACTS)?,
            opposing: list_field(fields, Self::NO_FACTS)?,
        })
    }

    pub fn fact_count(&self) -> usize {
        self.supporting.len() + self.opposing.len()
    }
}

// ==================== Routing and answers ====================

/// Answer type of a query with respect to its documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteLabel {
    Opposing,
    NotOpposing,
    Unanswerable,
}

impl std::str::FromStr for RouteLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        if normalized.contains("not opposing") {
            Ok(RouteLabel::NotOpposing)
        } else if normalized.contains("opposing") {
            Ok(RouteLabel::Opposing)
        } else if normalized.contains("unanswerable") {
            Ok(RouteLabel::Unanswerable)
        } else {
            Err(format!("unknown route label '{}'", s.trim()))
        }
    }
}

/// Routing classification with its one-sentence justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub label: RouteLabel,
    pub reasoning: String,
}

impl RouteDecision {
    pub const LABEL: &'static str = "label";
    pub const REASONING: &'static str = "reasoning";

    pub fn from_fields(fields: &FieldMap) -> Result<Self, SchemaError> {
        let raw_label = text_field(fields, Self::LABEL)?;
        let label = raw_label.parse().map_err(|reason| SchemaError::Malformed {
            field: Self::LABEL.to_string(),
            reason,
        })?;
        Ok(Self {
            label,
            reasoning: text_field(fields, Self::REASONING)?,
        })
    }
}

/// Explanation of why a query cannot be answered, with related questions
/// the documents can answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abstention {
    pub summary: String,
    pub questions: Vec<String>,
}

impl Abstention {
    pub const SUMMARY: &'static str = "summary";
    pub const QUESTIONS: &'static str = "questions";

    pub fn from_fields(fields: &FieldMap) -> Result<Self, SchemaError> {
        Ok(Self {
            summary: text_field(fields, Self::SUMMARY)?,
            questions: list_field(fields, Self::QUESTIONS)?,
        })
    }
}

/// Cited summary answering a query directly.
pub fn summary_from_fields(fields: &FieldMap) -> Result<String, SchemaError> {
    text_field(fields, Abstention::SUMMARY)
}

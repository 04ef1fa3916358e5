//! Escalating extraction of required fields from raw model text.
//!
//! [`extract`] runs a fixed pipeline:
//!
//! | Tier | Function | Accepts when |
//! |------|----------|--------------|
//! | gate | [`presence_gate`] | every required name occurs in the text |
//! | 1 | [`parse_structured`] | the whole text (fences stripped) is one JSON object covering every field |
//! | 2 | [`parse_fenced_block`] | the last ` ```json ` block is a JSON object covering every field |
//! | 3 | [`parse_line_patterns`] | always; returns whatever `"<field>": <value>` lines it finds |
//!
//! The gate failing is the only hard failure. Tier 3 never fails, even when
//! its map is partial; callers decide whether a partial map is usable.

use super::field::{FieldMap, normalize_field_name, normalize_text};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static FENCED_JSON_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```[ \t]*json[ \t]*(.*?)```").expect("fenced block pattern is valid")
});

/// Reason an extraction was rejected outright.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("Required field '{0}' does not appear in the output")]
    MissingField(String),
}

/// Which tier produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    Structured,
    FencedBlock,
    LinePattern,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Structured => "structured",
            ExtractionStrategy::FencedBlock => "fenced_block",
            ExtractionStrategy::LinePattern => "line_pattern",
        }
    }
}

/// Successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub fields: FieldMap,
    pub strategy: ExtractionStrategy,
    /// Whether every required field has a value. Only a
    /// [`ExtractionStrategy::LinePattern`] result can be incomplete.
    pub complete: bool,
}

impl Extraction {
    /// True when the best-effort line-pattern tier had to be used.
    pub fn is_last_resort(&self) -> bool {
        self.strategy == ExtractionStrategy::LinePattern
    }
}

/// Extract `required` fields from `raw`.
pub fn extract<S: AsRef<str>>(raw: &str, required: &[S]) -> Result<Extraction, ExtractionFailure> {
    presence_gate(raw, required)?;

    if let Some(fields) = parse_structured(raw)
        && fields.is_complete(required)
    {
        return Ok(Extraction {
            fields,
            strategy: ExtractionStrategy::Structured,
            complete: true,
        });
    }

    if let Some(fields) = parse_fenced_block(raw)
        && fields.is_complete(required)
    {
        return Ok(Extraction {
            fields,
            strategy: ExtractionStrategy::FencedBlock,
            complete: true,
        });
    }

    let fields = parse_line_patterns(raw, required);
    let complete = fields.is_complete(required);
    Ok(Extraction {
        fields,
        strategy: ExtractionStrategy::LinePattern,
        complete,
    })
}

/// Fail with [`ExtractionFailure::MissingField`] when a required name does
/// not occur anywhere in the (normalized) text.
pub fn presence_gate<S: AsRef<str>>(raw: &str, required: &[S]) -> Result<(), ExtractionFailure> {
    let haystack = normalize_text(raw);
    for name in required {
        if !haystack.contains(&normalize_field_name(name.as_ref())) {
            return Err(ExtractionFailure::MissingField(name.as_ref().to_string()));
        }
    }
    Ok(())
}

/// Parse the entire text as one JSON object after removing code fences
/// and a leading language tag.
pub fn parse_structured(raw: &str) -> Option<FieldMap> {
    parse_object(strip_fences(raw))
}

/// Parse the last ` ```json ` fenced block in the text.
pub fn parse_fenced_block(raw: &str) -> Option<FieldMap> {
    let block = FENCED_JSON_BLOCK
        .captures_iter(raw)
        .last()?
        .get(1)?
        .as_str();
    parse_object(block)
}

/// Match `"<field>": <value>` lines (quotes optional, case-insensitive,
/// underscore/space-insensitive) and keep each trailing value verbatim.
/// A later line for the same field wins.
pub fn parse_line_patterns<S: AsRef<str>>(raw: &str, required: &[S]) -> FieldMap {
    let mut fields = FieldMap::new();
    let alternatives: Vec<String> = required
        .iter()
        .map(|name| {
            normalize_field_name(name.as_ref())
                .split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join("[ _]")
        })
        .collect();
    if alternatives.is_empty() {
        return fields;
    }

    let pattern = format!(r#"(?i)"?({})"?:[ \t]*(.+)"#, alternatives.join("|"));
    let Ok(line_pattern) = Regex::new(&pattern) else {
        return fields;
    };

    for captures in line_pattern.captures_iter(raw) {
        if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
            fields.insert(key.as_str(), Value::String(value.as_str().to_string()));
        }
    }
    fields
}

fn parse_object(text: &str) -> Option<FieldMap> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(object)) => Some(FieldMap::from_object(object)),
        _ => None,
    }
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text = text.trim();
    if let Some(tag) = text.get(..4)
        && tag.eq_ignore_ascii_case("json")
    {
        let rest = text[4..].trim_start();
        if rest.starts_with('{') {
            text = rest;
        }
    }
    text
}

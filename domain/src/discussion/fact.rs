//! Facts attributed to documents.

use crate::contract::FactReport;
use crate::core::error::DomainError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\D*(\d+)\]").expect("citation pattern is valid"));

/// Whether a fact argues for or against the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Supporting,
    Opposing,
}

impl Stance {
    /// Label used in rendered outlines.
    pub fn outline_label(&self) -> &'static str {
        match self {
            Stance::Supporting => "Yes",
            Stance::Opposing => "No",
        }
    }
}

/// A labeled claim drawn from one document (zero-based index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub claim: String,
    pub stance: Stance,
    pub document: usize,
}

impl Fact {
    pub fn new(claim: impl Into<String>, stance: Stance, document: usize) -> Self {
        Self {
            claim: claim.into(),
            stance,
            document,
        }
    }

    /// Supporting facts first, then opposing, all attributed to `document`.
    pub fn from_report(report: &FactReport, document: usize) -> Vec<Fact> {
        report
            .supporting
            .iter()
            .map(|claim| Fact::new(claim.clone(), Stance::Supporting, document))
            .chain(
                report
                    .opposing
                    .iter()
                    .map(|claim| Fact::new(claim.clone(), Stance::Opposing, document)),
            )
            .collect()
    }

    /// Like [`Fact::from_report`], but each claim names its own document
    /// with an inline `[N]` marker. All claims are checked before any fact
    /// is returned.
    pub fn from_cited_report(report: &FactReport) -> Result<Vec<Fact>, DomainError> {
        let claims = report
            .supporting
            .iter()
            .map(|c| (c, Stance::Supporting))
            .chain(report.opposing.iter().map(|c| (c, Stance::Opposing)));

        claims
            .map(|(claim, stance)| {
                let (clean, number) = split_citation(claim)
                    .ok_or_else(|| DomainError::MissingCitation(claim.clone()))?;
                Ok(Fact::new(clean, stance, number - 1))
            })
            .collect()
    }
}

/// Strip citation markers from `text`, returning the cleaned claim and the
/// first cited one-based document number. `None` if no usable marker.
pub fn split_citation(text: &str) -> Option<(String, usize)> {
    let number = CITATION
        .captures(text)?
        .get(1)?
        .as_str()
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)?;
    let clean = CITATION.replace_all(text, "").replace(" .", ".");
    Some((clean.trim().to_string(), number))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(supporting: &[&str], opposing: &[&str]) -> FactReport {
        FactReport {
            topic: "Cost".to_string(),
            supporting: supporting.iter().map(|s| s.to_string()).collect(),
            opposing: opposing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_from_report_orders_supporting_first() {
        let facts = Fact::from_report(&report(&["a"], &["b", "c"]), 1);
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].stance, Stance::Supporting);
        assert_eq!(facts[2].claim, "c");
        assert!(facts.iter().all(|f| f.document == 1));
    }

    #[test]
    fn test_split_citation() {
        assert_eq!(
            split_citation("Buses are cheaper [2]."),
            Some(("Buses are cheaper.".to_string(), 2))
        );
        assert_eq!(
            split_citation("Trains pollute less [Document 3]"),
            Some(("Trains pollute less".to_string(), 3))
        );
        assert_eq!(split_citation("No marker here."), None);
        assert_eq!(split_citation("Zero is not a document [0]"), None);
    }

    #[test]
    fn test_cited_report_uses_marker_as_provenance() {
        let facts = Fact::from_cited_report(&report(&["Cheap [1]"], &["Slow [2]"])).unwrap();
        assert_eq!(facts[0].document, 0);
        assert_eq!(facts[1].document, 1);
        assert_eq!(facts[1].claim, "Slow");
    }

    #[test]
    fn test_cited_report_rejects_uncited_claim() {
        let err = Fact::from_cited_report(&report(&["Cheap [1]"], &["Slow"])).unwrap_err();
        assert_eq!(err, DomainError::MissingCitation("Slow".to_string()));
    }
}

//! Discussion state: the outline built up over one session.
//!
//! Each planned topic owns exactly one [`TopicEntry`] holding its label,
//! its speaker-assignment slot and its fact bucket. Because the three live
//! in the same entry, the topic list, the assignment list and the bucket
//! list always have the same length.
//!
//! Ordering rules:
//! - topics keep planning order and are only replaced wholesale
//!   ([`DiscussionState::redefine_topics`])
//! - an assignment slot is filled once
//! - facts are appended in the order they are recorded, and only from
//!   documents named in the topic's assignment

use super::assignment::SpeakerAssignment;
use super::fact::{Fact, Stance};
use super::topic::DiscussionPoint;
use crate::contract::FactReport;
use crate::core::error::DomainError;
use crate::core::query::Query;
use serde::{Deserialize, Serialize};

/// One topic with its assignment slot and fact bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    topic: DiscussionPoint,
    assignment: Option<SpeakerAssignment>,
    facts: Vec<Fact>,
}

impl TopicEntry {
    fn new(topic: DiscussionPoint) -> Self {
        Self {
            topic,
            assignment: None,
            facts: Vec::new(),
        }
    }

    pub fn topic(&self) -> &DiscussionPoint {
        &self.topic
    }

    pub fn assignment(&self) -> Option<&SpeakerAssignment> {
        self.assignment.as_ref()
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }
}

/// Owned, round-indexed record of one session.
///
/// `Clone` is a deep copy: every container is owned, so a cloned variant
/// never aliases the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionState {
    query: Query,
    topics: Vec<TopicEntry>,
}

impl DiscussionState {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            topics: Vec::new(),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Install the planned topics. Only allowed once.
    pub fn set_topics(&mut self, topics: Vec<DiscussionPoint>) -> Result<(), DomainError> {
        if !self.topics.is_empty() {
            return Err(DomainError::TopicsAlreadyPlanned);
        }
        self.topics = topics.into_iter().map(TopicEntry::new).collect();
        Ok(())
    }

    /// Replace the topic list wholesale, discarding all assignments and
    /// facts.
    pub fn redefine_topics(&mut self, topics: Vec<DiscussionPoint>) {
        self.topics = topics.into_iter().map(TopicEntry::new).collect();
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn entries(&self) -> &[TopicEntry] {
        &self.topics
    }

    pub fn topics(&self) -> impl Iterator<Item = &DiscussionPoint> {
        self.topics.iter().map(TopicEntry::topic)
    }

    /// One slot per topic; `None` until the topic's speakers are selected.
    pub fn assignments(&self) -> impl Iterator<Item = Option<&SpeakerAssignment>> {
        self.topics.iter().map(TopicEntry::assignment)
    }

    /// One fact bucket per topic.
    pub fn buckets(&self) -> impl Iterator<Item = &[Fact]> {
        self.topics.iter().map(TopicEntry::facts)
    }

    pub fn topic(&self, index: usize) -> Result<&DiscussionPoint, DomainError> {
        self.entry(index).map(TopicEntry::topic)
    }

    pub fn assignment(&self, index: usize) -> Result<Option<&SpeakerAssignment>, DomainError> {
        self.entry(index).map(TopicEntry::assignment)
    }

    pub fn facts(&self, index: usize) -> Result<&[Fact], DomainError> {
        self.entry(index).map(TopicEntry::facts)
    }

    /// Fill the assignment slot of a topic.
    pub fn record_selection(
        &mut self,
        index: usize,
        assignment: SpeakerAssignment,
    ) -> Result<(), DomainError> {
        let entry = self.entry_mut(index)?;
        if entry.assignment.is_some() {
            return Err(DomainError::SelectionAlreadyRecorded { topic: index });
        }
        entry.assignment = Some(assignment);
        Ok(())
    }

    /// `(document, detail)` pairs in speaking order for a topic.
    pub fn speakers_for(&self, index: usize) -> Result<Vec<(usize, Option<String>)>, DomainError> {
        let assignment = self
            .assignment(index)?
            .ok_or(DomainError::SelectionMissing { topic: index })?;
        Ok(assignment
            .speakers()
            .iter()
            .map(|s| (s.document, s.detail.clone()))
            .collect())
    }

    /// Append a speaker's facts to a topic's bucket. Returns how many facts
    /// were added.
    pub fn record_facts(
        &mut self,
        index: usize,
        report: &FactReport,
        document: usize,
    ) -> Result<usize, DomainError> {
        let facts = Fact::from_report(report, document);
        self.append_facts(index, facts)
    }

    /// Append facts whose provenance comes from inline `[N]` markers.
    /// Either every fact is recorded or none is.
    pub fn record_cited_facts(
        &mut self,
        index: usize,
        report: &FactReport,
    ) -> Result<usize, DomainError> {
        let facts = Fact::from_cited_report(report)?;
        self.append_facts(index, facts)
    }

    /// Every topic has its speakers selected.
    pub fn is_complete(&self) -> bool {
        self.topics.iter().all(|e| e.assignment.is_some())
    }

    pub fn fact_count(&self) -> usize {
        self.topics.iter().map(|e| e.facts.len()).sum()
    }

    /// Plain-text outline: the query, then each topic with its facts
    /// (supporting before opposing) and one-based citations.
    pub fn render_outline(&self) -> String {
        let mut out = format!("Query: {}", self.query);
        for entry in &self.topics {
            out.push_str(&format!("\n\nTopic: {}", entry.topic));
            out.push_str("\nFacts:");
            let supporting = entry
                .facts
                .iter()
                .filter(|f| f.stance == Stance::Supporting);
            let opposing = entry
                .facts
                .iter()
                .filter(|f| f.stance == Stance::Opposing);
            for fact in supporting.chain(opposing) {
                out.push_str(&format!(
                    "\n- {}: {} [{}]",
                    fact.stance.outline_label(),
                    fact.claim,
                    fact.document + 1
                ));
            }
        }
        out
    }

    fn append_facts(&mut self, index: usize, facts: Vec<Fact>) -> Result<usize, DomainError> {
        let entry = self.entry_mut(index)?;
        let assignment = entry
            .assignment
            .as_ref()
            .ok_or(DomainError::SelectionMissing { topic: index })?;
        if let Some(stray) = facts.iter().find(|f| !assignment.contains(f.document)) {
            return Err(DomainError::UnassignedSpeaker {
                topic: index,
                document: stray.document,
            });
        }
        let added = facts.len();
        entry.facts.extend(facts);
        Ok(added)
    }

    fn entry(&self, index: usize) -> Result<&TopicEntry, DomainError> {
        let len = self.topics.len();
        self.topics
            .get(index)
            .ok_or(DomainError::TopicOutOfRange { index, len })
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut TopicEntry, DomainError> {
        let len = self.topics.len();
        self.topics
            .get_mut(index)
            .ok_or(DomainError::TopicOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::SelectionResult;
    use crate::discussion::assignment::SelectionDetail;
    use std::collections::BTreeMap;

    fn planned(topics: &[&str]) -> DiscussionState {
        let mut state = DiscussionState::new(Query::new("Should cities ban cars?"));
        state
            .set_topics(topics.iter().map(|t| DiscussionPoint::from(*t)).collect())
            .unwrap();
        state
    }

    fn report(supporting: &[&str], opposing: &[&str]) -> FactReport {
        FactReport {
            topic: "t".to_string(),
            supporting: supporting.iter().map(|s| s.to_string()).collect(),
            opposing: opposing.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn assert_parallel(state: &DiscussionState) {
        let topics = state.topics().count();
        assert_eq!(topics, state.assignments().count());
        assert_eq!(topics, state.buckets().count());
    }

    #[test]
    fn test_lengths_stay_parallel() {
        let mut state = DiscussionState::new(Query::new("q"));
        assert_parallel(&state);

        state
            .set_topics(vec!["Cost".into(), "Safety".into()])
            .unwrap();
        assert_parallel(&state);

        state
            .record_selection(0, SpeakerAssignment::everyone(2))
            .unwrap();
        assert_parallel(&state);

        state.record_facts(0, &report(&["a"], &["b"]), 1).unwrap();
        assert_parallel(&state);

        state.redefine_topics(vec!["Only".into()]);
        assert_parallel(&state);
        assert_eq!(state.topic_count(), 1);
        assert_eq!(state.fact_count(), 0);
    }

    #[test]
    fn test_topics_planned_once() {
        let mut state = planned(&["Cost"]);
        assert_eq!(
            state.set_topics(vec!["Again".into()]),
            Err(DomainError::TopicsAlreadyPlanned)
        );
    }

    #[test]
    fn test_selection_recorded_once() {
        let mut state = planned(&["Cost"]);
        state
            .record_selection(0, SpeakerAssignment::everyone(1))
            .unwrap();
        assert_eq!(
            state.record_selection(0, SpeakerAssignment::everyone(1)),
            Err(DomainError::SelectionAlreadyRecorded { topic: 0 })
        );
    }

    #[test]
    fn test_facts_require_assignment() {
        let mut state = planned(&["Cost"]);
        assert_eq!(
            state.record_facts(0, &report(&["a"], &[]), 0),
            Err(DomainError::SelectionMissing { topic: 0 })
        );
        assert_eq!(
            state.record_facts(3, &report(&["a"], &[]), 0),
            Err(DomainError::TopicOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_facts_only_from_assigned_documents() {
        let mut state = planned(&["Cost"]);
        let selection = SelectionResult {
            relevant: vec![1],
            details: BTreeMap::new(),
        };
        state
            .record_selection(
                0,
                SpeakerAssignment::from_selection(selection, SelectionDetail::None),
            )
            .unwrap();

        assert_eq!(
            state.record_facts(0, &report(&["a"], &[]), 0),
            Err(DomainError::UnassignedSpeaker {
                topic: 0,
                document: 0
            })
        );
        assert_eq!(state.record_facts(0, &report(&["a"], &["b"]), 1), Ok(2));
        assert_eq!(state.facts(0).unwrap()[1].stance, Stance::Opposing);
    }

    #[test]
    fn test_cited_facts_are_all_or_nothing() {
        let mut state = planned(&["Cost"]);
        state
            .record_selection(0, SpeakerAssignment::everyone(2))
            .unwrap();

        let bad = report(&["cheap [1]"], &["slow"]);
        assert!(state.record_cited_facts(0, &bad).is_err());
        assert!(state.facts(0).unwrap().is_empty());

        let stray = report(&["cheap [1]"], &["slow [5]"]);
        assert!(state.record_cited_facts(0, &stray).is_err());
        assert!(state.facts(0).unwrap().is_empty());

        let good = report(&["cheap [1]"], &["slow [2]"]);
        assert_eq!(state.record_cited_facts(0, &good), Ok(2));
        assert_eq!(state.facts(0).unwrap()[1].document, 1);
    }

    #[test]
    fn test_speakers_for_returns_details() {
        let mut state = planned(&["Cost"]);
        let selection = SelectionResult {
            relevant: vec![1, 0],
            details: BTreeMap::from([
                (0, "q0".to_string()),
                (1, "q1".to_string()),
            ]),
        };
        state
            .record_selection(
                0,
                SpeakerAssignment::from_selection(selection, SelectionDetail::Question),
            )
            .unwrap();
        assert_eq!(
            state.speakers_for(0).unwrap(),
            vec![(1, Some("q1".to_string())), (0, Some("q0".to_string()))]
        );
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = planned(&["Cost", "Safety"]);
        original
            .record_selection(0, SpeakerAssignment::everyone(2))
            .unwrap();
        original.record_facts(0, &report(&["a"], &[]), 0).unwrap();

        let mut variant = original.clone();
        variant.record_facts(0, &report(&["b"], &["c"]), 1).unwrap();
        variant
            .record_selection(1, SpeakerAssignment::everyone(2))
            .unwrap();

        assert_eq!(original.facts(0).unwrap().len(), 1);
        assert!(original.assignment(1).unwrap().is_none());
        assert_eq!(variant.facts(0).unwrap().len(), 3);
    }

    #[test]
    fn test_render_outline() {
        let mut state = planned(&["Cost"]);
        state
            .record_selection(0, SpeakerAssignment::everyone(2))
            .unwrap();
        state.record_facts(0, &report(&[], &["Costly."]), 0).unwrap();
        state.record_facts(0, &report(&["Cheap."], &[]), 1).unwrap();

        assert_eq!(
            state.render_outline(),
            "Query: Should cities ban cars?\n\nTopic: Cost\nFacts:\n- Yes: Cheap. [2]\n- No: Costly. [1]"
        );
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = planned(&["Cost"]);
        state
            .record_selection(0, SpeakerAssignment::everyone(1))
            .unwrap();
        state.record_facts(0, &report(&["a"], &[]), 0).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let restored: DiscussionState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
        assert!(restored.is_complete());
    }
}

//! Moderator
//!
//! Plans the discussion points of a session and, for each point, decides
//! which documents speak. Every request goes through the
//! [`GenerationGateway`]; speaker selection adds its own regeneration loop
//! on top of the gateway's semantic retry.

use crate::ports::conversation_logger::{ConversationEvent, event_type};
use crate::ports::retriever::Retriever;
use crate::use_cases::generate::GenerationGateway;
use crate::use_cases::run_session::DiscussionError;
use crate::use_cases::shared::check_cancelled;
use mods_domain::{
    Abstention, DiscussionPoint, FieldMap, ModeratorPrompt, Query, RetryContext, RouteDecision,
    SelectionDetail, SelectionResult, SpeakerAssignment, TopicPlan, TopicProposal,
    contract::summary_from_fields, discussion::duplicate_labels,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of [`Moderator::select_speakers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Selected(SpeakerAssignment),
    /// Every attempt produced an unusable or incomplete selection.
    Failed { attempts: usize },
}

/// Routing classification together with the context it was made on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    pub decision: Option<RouteDecision>,
    pub context: String,
}

pub struct Moderator {
    gateway: GenerationGateway,
    retriever: Arc<dyn Retriever>,
    selection_attempts: usize,
}

impl Moderator {
    pub fn new(gateway: GenerationGateway, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            gateway,
            retriever,
            selection_attempts: 5,
        }
    }

    pub fn with_selection_attempts(mut self, attempts: usize) -> Self {
        self.selection_attempts = attempts;
        self
    }

    /// Plan exactly `topic_count` topics from the best passages of every
    /// document. `None` when the model never produced a usable plan.
    pub async fn plan_topics(
        &self,
        query: &Query,
        topic_count: usize,
        top_k: usize,
    ) -> Result<Option<Vec<DiscussionPoint>>, DiscussionError> {
        let candidates = self
            .retriever
            .best_candidates(query.content(), top_k)
            .await?;
        let keys = TopicPlan::field_names(topic_count);
        let prompt = ModeratorPrompt::plan_topics(query.content(), &candidates.render(), &keys);

        let plan = self
            .gateway
            .generate(&prompt, &keys, |fields| {
                TopicPlan::from_fields(fields, topic_count)
            })
            .await?;

        Ok(plan.map(|plan| {
            let topics: Vec<DiscussionPoint> =
                plan.topics.iter().map(|t| DiscussionPoint::new(t.as_str())).collect();
            let duplicates = duplicate_labels(&topics);
            if !duplicates.is_empty() {
                warn!("Planned topics are not distinct: {:?}", duplicates);
            }
            info!("Planned {} topics", topics.len());
            topics
        }))
    }

    /// Open-ended planning over a prepared context: three central points
    /// plus up to `topic_count - 3` others.
    pub async fn propose_topics(
        &self,
        query: &Query,
        topic_count: usize,
        context: &str,
    ) -> Result<Option<TopicProposal>, DiscussionError> {
        let prompt = ModeratorPrompt::propose_topics(query.content(), context, topic_count);
        Ok(self
            .gateway
            .generate(&prompt, &[TopicProposal::IMPORTANT_POINTS], TopicProposal::from_fields)
            .await?)
    }

    /// Choose the speakers for one topic.
    ///
    /// With a detail requested, a selection is only accepted when every
    /// relevant document carries its rationale or question; otherwise the
    /// whole selection is generated again, up to `selection_attempts`.
    pub async fn select_speakers(
        &self,
        query: &Query,
        topic: &DiscussionPoint,
        top_k: usize,
        detail: SelectionDetail,
        retrieve_by_topic: bool,
    ) -> Result<SelectionOutcome, DiscussionError> {
        let retrieval_query = if retrieve_by_topic {
            topic.label()
        } else {
            query.content()
        };
        let candidates = self
            .retriever
            .best_candidates(retrieval_query, top_k)
            .await?;
        let document_count = candidates.len();
        let prompt = ModeratorPrompt::select_speakers(topic.label(), &candidates.render(), detail);

        let mut retry = RetryContext::new(self.selection_attempts);
        while retry.next_attempt() {
            check_cancelled(self.gateway.cancellation())?;
            let listed = self
                .gateway
                .generate(
                    &prompt,
                    &[SelectionResult::RELEVANT_DOCUMENTS],
                    |fields: &FieldMap| {
                        let relevant = SelectionResult::relevant_from_fields(fields, document_count)?;
                        Ok((relevant, fields.clone()))
                    },
                )
                .await?;

            let reason = match listed {
                None => "no relevant-document list".to_string(),
                Some((relevant, fields)) => {
                    match SelectionResult::with_details(relevant, &fields, detail) {
                        Ok(selection) => {
                            debug!(
                                "Selected documents {:?} for topic '{}'",
                                selection.relevant, topic
                            );
                            return Ok(SelectionOutcome::Selected(
                                SpeakerAssignment::from_selection(selection, detail),
                            ));
                        }
                        Err(error) => error.to_string(),
                    }
                }
            };

            warn!(
                "Regenerating speaker selection for '{}' (attempt {}/{}): {}",
                topic,
                retry.attempt(),
                retry.max_attempts(),
                reason
            );
            self.gateway.logger().log(ConversationEvent::new(
                event_type::SELECTION_RETRY,
                json!({
                    "topic": topic.label(),
                    "attempt": retry.attempt(),
                    "max_attempts": retry.max_attempts(),
                    "reason": reason,
                }),
            ));
        }

        Ok(SelectionOutcome::Failed {
            attempts: retry.max_attempts(),
        })
    }

    /// Classify the query as opposing, not opposing or unanswerable.
    pub async fn route_query(&self, query: &Query, top_k: usize) -> Result<Routing, DiscussionError> {
        let candidates = self
            .retriever
            .best_candidates(query.content(), top_k)
            .await?;
        let context = candidates.render();
        let prompt = ModeratorPrompt::route_query(query.content(), &context);
        let decision = self
            .gateway
            .generate(
                &prompt,
                &[RouteDecision::LABEL, RouteDecision::REASONING],
                RouteDecision::from_fields,
            )
            .await?;
        Ok(Routing { decision, context })
    }

    /// Short cited answer.
    pub async fn answer_query(
        &self,
        query: &Query,
        context: &str,
    ) -> Result<Option<String>, DiscussionError> {
        let prompt = ModeratorPrompt::answer_query(query.content(), context);
        Ok(self
            .gateway
            .generate(&prompt, &[Abstention::SUMMARY], summary_from_fields)
            .await?)
    }

    /// Why the query cannot be answered, plus answerable alternatives.
    pub async fn abstain(
        &self,
        query: &Query,
        context: &str,
    ) -> Result<Option<Abstention>, DiscussionError> {
        let prompt = ModeratorPrompt::abstain(query.content(), context);
        Ok(self
            .gateway
            .generate(
                &prompt,
                &[Abstention::SUMMARY, Abstention::QUESTIONS],
                Abstention::from_fields,
            )
            .await?)
    }
}

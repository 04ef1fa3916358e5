//! Run Session use case
//!
//! Runs one dataset item end to end:
//!
//! ```text
//! Planning ─▶ for each variant (deep clone of the plan):
//!               for each topic: SpeakerSelection ─▶ FactElicitation
//!          ─▶ Complete | Failed
//! ```
//!
//! Any error inside an attempt restarts the whole item from planning, up
//! to `session_attempts`. After the last attempt every variant of the item
//! is recorded as failed; only cancellation escapes as an error.

use crate::config::{DiscussionParams, RetryLimits};
use crate::ports::conversation_logger::{ConversationEvent, event_type};
use crate::ports::dataset::DatasetItem;
use crate::ports::progress::{DiscussionProgress, NoProgress};
use crate::ports::retriever::{RetrievalError, RetrieverFactory};
use crate::use_cases::generate::{GenerationError, GenerationGateway};
use crate::use_cases::moderator::{Moderator, SelectionOutcome};
use crate::use_cases::shared::check_cancelled;
use crate::use_cases::speaker::Speaker;
use futures::future::join_all;
use mods_domain::{
    DiscussionPoint, DiscussionState, DomainError, FactReport, Query, RetryContext, SessionRecord,
    SpeakerAssignment, VariantKey,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end one session attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscussionError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Discussion state error: {0}")]
    Domain(#[from] DomainError),

    #[error("{operation} produced no usable output after {attempts} attempts")]
    ContractExhausted {
        operation: &'static str,
        attempts: usize,
    },

    #[error("Speaker selection for '{topic}' failed after {attempts} attempts")]
    SelectionFailed { topic: String, attempts: usize },

    #[error("No speaker for document {document}")]
    UnknownSpeaker { document: usize },
}

impl DiscussionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DiscussionError::Generation(e) if e.is_cancelled())
    }
}

/// Use case for running one item's discussion
pub struct RunSessionUseCase {
    gateway: GenerationGateway,
    retrievers: Arc<dyn RetrieverFactory>,
    params: DiscussionParams,
    limits: RetryLimits,
}

impl RunSessionUseCase {
    /// The gateway's retry ceilings are taken from `limits`.
    pub fn new(
        gateway: GenerationGateway,
        retrievers: Arc<dyn RetrieverFactory>,
        params: DiscussionParams,
        limits: RetryLimits,
    ) -> Self {
        let gateway = gateway
            .with_transport_attempts(limits.transport_attempts)
            .with_semantic_attempts(limits.semantic_attempts);
        Self {
            gateway,
            retrievers,
            params,
            limits,
        }
    }

    pub fn params(&self) -> &DiscussionParams {
        &self.params
    }

    pub fn gateway(&self) -> &GenerationGateway {
        &self.gateway
    }

    /// Execute with default (no-op) progress
    pub async fn execute(
        &self,
        item: &DatasetItem,
    ) -> Result<Vec<(VariantKey, SessionRecord)>, DiscussionError> {
        self.execute_with_progress(item, &NoProgress).await
    }

    /// One record per configured variant, in variant order.
    pub async fn execute_with_progress(
        &self,
        item: &DatasetItem,
        progress: &dyn DiscussionProgress,
    ) -> Result<Vec<(VariantKey, SessionRecord)>, DiscussionError> {
        self.execute_variants(item, &self.params.variants, None, progress)
            .await
    }

    /// One record per entry of `variants`, in that order. With
    /// `shared_plan` the item is not planned again; every attempt starts
    /// from those topics.
    pub async fn execute_variants(
        &self,
        item: &DatasetItem,
        variants: &[VariantKey],
        shared_plan: Option<Vec<DiscussionPoint>>,
        progress: &dyn DiscussionProgress,
    ) -> Result<Vec<(VariantKey, SessionRecord)>, DiscussionError> {
        let mut retry = RetryContext::new(self.limits.session_attempts);
        let mut last_error = String::new();

        while retry.next_attempt() {
            match self
                .run_once(item, variants, shared_plan.as_deref(), progress)
                .await
            {
                Ok(states) => {
                    return Ok(states
                        .into_iter()
                        .map(|(variant, state)| (variant, SessionRecord::completed(state)))
                        .collect());
                }
                Err(error) if error.is_cancelled() => return Err(error),
                Err(error) => {
                    warn!(
                        "Session for '{}' failed (attempt {}/{}): {}",
                        item.query,
                        retry.attempt(),
                        retry.max_attempts(),
                        error
                    );
                    last_error = error.to_string();
                    progress.on_session_retry(retry.attempt(), retry.max_attempts(), &last_error);
                    self.gateway.logger().log(ConversationEvent::new(
                        event_type::SESSION_RETRY,
                        json!({
                            "query": item.query.content(),
                            "attempt": retry.attempt(),
                            "max_attempts": retry.max_attempts(),
                            "error": last_error,
                        }),
                    ));
                }
            }
        }

        warn!(
            "Giving up on '{}' after {} attempts",
            item.query,
            retry.max_attempts()
        );
        Ok(variants
            .iter()
            .map(|variant| (*variant, SessionRecord::failed(last_error.clone())))
            .collect())
    }

    async fn run_once(
        &self,
        item: &DatasetItem,
        variants: &[VariantKey],
        shared_plan: Option<&[DiscussionPoint]>,
        progress: &dyn DiscussionProgress,
    ) -> Result<Vec<(VariantKey, DiscussionState)>, DiscussionError> {
        check_cancelled(self.gateway.cancellation())?;
        let retriever = self.retrievers.build(&item.documents)?;
        let moderator = Moderator::new(self.gateway.clone(), Arc::clone(&retriever))
            .with_selection_attempts(self.limits.selection_attempts);
        let speakers: Vec<Speaker> = item
            .documents
            .iter()
            .map(|doc| {
                Speaker::new(
                    doc.clone(),
                    self.gateway.clone(),
                    Arc::clone(&retriever),
                    self.params.token_budget,
                )
            })
            .collect();

        let base = match shared_plan {
            Some(topics) => {
                debug!("Reusing {} recorded topics for '{}'", topics.len(), item.query);
                progress.on_topics_planned(topics);
                let mut state = DiscussionState::new(item.query.clone());
                state.set_topics(topics.to_vec())?;
                state
            }
            None => self.plan(&item.query, &moderator, progress).await?,
        };

        let mut outcomes = Vec::with_capacity(variants.len());
        for variant in variants {
            let state = self
                .run_variant(&base, *variant, &moderator, &speakers, progress)
                .await?;
            outcomes.push((*variant, state));
        }
        Ok(outcomes)
    }

    /// Plan the shared topic list for an item.
    async fn plan(
        &self,
        query: &Query,
        moderator: &Moderator,
        progress: &dyn DiscussionProgress,
    ) -> Result<DiscussionState, DiscussionError> {
        let topics = moderator
            .plan_topics(query, self.params.topic_count, self.params.top_k)
            .await?
            .ok_or(DiscussionError::ContractExhausted {
                operation: "Topic planning",
                attempts: self.limits.semantic_attempts,
            })?;
        progress.on_topics_planned(&topics);

        let mut state = DiscussionState::new(query.clone());
        state.set_topics(topics)?;
        Ok(state)
    }

    /// Run every topic of one variant on a deep copy of the plan.
    async fn run_variant(
        &self,
        base: &DiscussionState,
        variant: VariantKey,
        moderator: &Moderator,
        speakers: &[Speaker],
        progress: &dyn DiscussionProgress,
    ) -> Result<DiscussionState, DiscussionError> {
        info!("Running variant {}", variant);
        let mut state = base.clone();
        for index in 0..state.topic_count() {
            let topic = state.topic(index)?.clone();
            progress.on_topic_start(variant, index, &topic);

            let assignment = self
                .assign_speakers(&state, &topic, variant, moderator, speakers.len())
                .await?;
            state.record_selection(index, assignment)?;
            let selected = state.speakers_for(index)?;
            progress.on_speakers_selected(index, selected.len());

            let reports = self
                .elicit_all(&state, &topic, variant, &selected, speakers)
                .await?;
            for ((document, _), report) in selected.iter().zip(reports) {
                let added = state.record_facts(index, &report, *document)?;
                progress.on_speaker_complete(index, *document, added);
            }
        }
        Ok(state)
    }

    async fn assign_speakers(
        &self,
        state: &DiscussionState,
        topic: &DiscussionPoint,
        variant: VariantKey,
        moderator: &Moderator,
        document_count: usize,
    ) -> Result<SpeakerAssignment, DiscussionError> {
        if !self.params.select_agents {
            return Ok(SpeakerAssignment::everyone(document_count));
        }
        match moderator
            .select_speakers(
                state.query(),
                topic,
                self.params.top_k,
                self.params.detail_for(variant),
                self.params.use_subtopic_retrieval,
            )
            .await?
        {
            SelectionOutcome::Selected(assignment) => Ok(assignment),
            SelectionOutcome::Failed { attempts } => Err(DiscussionError::SelectionFailed {
                topic: topic.label().to_string(),
                attempts,
            }),
        }
    }

    /// Elicit every selected speaker. Reports come back in speaker order
    /// whether or not the calls ran concurrently.
    async fn elicit_all(
        &self,
        state: &DiscussionState,
        topic: &DiscussionPoint,
        variant: VariantKey,
        selected: &[(usize, Option<String>)],
        speakers: &[Speaker],
    ) -> Result<Vec<FactReport>, DiscussionError> {
        let calls = selected.iter().map(|(document, detail)| {
            let search_query = match detail {
                Some(detail) if variant.use_rationale => detail.as_str(),
                _ => topic.label(),
            };
            self.elicit_one(state.query(), topic, *document, search_query, speakers)
        });

        if self.params.parallel_speakers {
            debug!("Eliciting {} speakers concurrently", selected.len());
            join_all(calls).await.into_iter().collect()
        } else {
            let mut reports = Vec::with_capacity(selected.len());
            for call in calls {
                reports.push(call.await?);
            }
            Ok(reports)
        }
    }

    async fn elicit_one(
        &self,
        query: &Query,
        topic: &DiscussionPoint,
        document: usize,
        search_query: &str,
        speakers: &[Speaker],
    ) -> Result<FactReport, DiscussionError> {
        let speaker = speakers
            .get(document)
            .ok_or(DiscussionError::UnknownSpeaker { document })?;
        speaker
            .elicit(query, topic.label(), search_query, self.params.top_k)
            .await?
            .ok_or(DiscussionError::ContractExhausted {
                operation: "Fact elicitation",
                attempts: self.limits.semantic_attempts,
            })
    }
}

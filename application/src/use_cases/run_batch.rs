//! Run Batch use case
//!
//! Drives [`RunSessionUseCase`] over every item of every dataset, saving a
//! [`CheckpointBundle`] every `checkpoint_every` items and at the end of
//! each dataset. An existing bundle is loaded first. Only (variant, item)
//! pairs it does not hold are run, and stored records are never dropped,
//! so an interrupted run resumes where it left off and a later run may add
//! variants or items.

use crate::ports::checkpoint::{CheckpointError, CheckpointStore};
use crate::ports::conversation_logger::{ConversationEvent, event_type};
use crate::ports::dataset::Dataset;
use crate::ports::progress::{DiscussionProgress, NoProgress};
use crate::use_cases::run_session::RunSessionUseCase;
use crate::use_cases::shared::is_cancelled;
use mods_domain::{CheckpointBundle, RunSettings, SessionRecord, VariantKey};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum RunBatchError {
    #[error("No variants configured")]
    NoVariants,

    #[error("Checkpoint failed: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Checkpoint at {location} was written with {stored}, but this run uses {current}")]
    SettingsMismatch {
        location: String,
        stored: RunSettings,
        current: RunSettings,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunBatchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunBatchError::Cancelled)
    }
}

/// Input for the RunBatch use case
pub struct RunBatchInput {
    pub run_name: String,
    /// Items per dataset; 0 runs every item.
    pub num_to_run: usize,
    pub datasets: Vec<Arc<dyn Dataset>>,
}

impl RunBatchInput {
    pub fn new(run_name: impl Into<String>, datasets: Vec<Arc<dyn Dataset>>) -> Self {
        Self {
            run_name: run_name.into(),
            num_to_run: 0,
            datasets,
        }
    }

    pub fn with_num_to_run(mut self, num_to_run: usize) -> Self {
        self.num_to_run = num_to_run;
        self
    }
}

/// What a batch run did.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub bundle: CheckpointBundle,
    /// Items run in this invocation.
    pub processed: usize,
    /// Items skipped because a checkpoint already held them.
    pub skipped: usize,
    /// Items of this invocation recorded as failed.
    pub failed: usize,
}

/// Use case for running every dataset item
pub struct RunBatchUseCase {
    session: RunSessionUseCase,
    store: Arc<dyn CheckpointStore>,
    checkpoint_every: usize,
}

impl RunBatchUseCase {
    pub fn new(
        session: RunSessionUseCase,
        store: Arc<dyn CheckpointStore>,
        checkpoint_every: usize,
    ) -> Self {
        Self {
            session,
            store,
            checkpoint_every,
        }
    }

    /// Execute with default (no-op) progress
    pub async fn execute(&self, input: RunBatchInput) -> Result<BatchSummary, RunBatchError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: RunBatchInput,
        progress: &dyn DiscussionProgress,
    ) -> Result<BatchSummary, RunBatchError> {
        let variants = self.session.params().variants.clone();
        if variants.is_empty() {
            return Err(RunBatchError::NoVariants);
        }

        let settings = self.session.params().run_settings();
        let mut bundle = match self.store.load().await? {
            Some(bundle) => {
                info!("Resuming from checkpoint at {}", self.store.location());
                bundle
            }
            None => CheckpointBundle::new(input.run_name.clone()),
        };
        if let Some(stored) = bundle.settings
            && stored != settings
        {
            return Err(RunBatchError::SettingsMismatch {
                location: self.store.location(),
                stored,
                current: settings,
            });
        }
        bundle.settings = Some(settings);
        if bundle.run_name != input.run_name {
            warn!(
                "Checkpoint belongs to run '{}', continuing it as '{}'",
                bundle.run_name, input.run_name
            );
            bundle.run_name = input.run_name.clone();
        }

        let mut summary = BatchSummary {
            bundle: CheckpointBundle::default(),
            processed: 0,
            skipped: 0,
            failed: 0,
        };

        for dataset in &input.datasets {
            let name = dataset.name().to_string();
            let total = match input.num_to_run {
                0 => dataset.item_count(),
                n => n.min(dataset.item_count()),
            };
            let done = bundle.completed_items(&variants, &name).min(total);
            summary.skipped += done;

            info!("Dataset {}: {} items ({} already done)", name, total, done);
            progress.on_dataset_start(&name, total, done);

            for index in done..total {
                let pending = bundle.missing_variants(&variants, &name, index);
                if is_cancelled(self.session.gateway().cancellation()) {
                    self.save(&bundle, &name, index, progress).await?;
                    return Err(RunBatchError::Cancelled);
                }
                progress.on_item_start(&name, index);
                if pending.len() < variants.len() {
                    debug!(
                        "Item {} of {}: running {} of {} variants",
                        index,
                        name,
                        pending.len(),
                        variants.len()
                    );
                }

                let records = match dataset.get_item(index) {
                    Ok(item) => {
                        let plan = bundle.planned_topics(&variants, &name, index);
                        match self
                            .session
                            .execute_variants(&item, &pending, plan, progress)
                            .await
                        {
                            Ok(records) => records,
                            Err(error) if error.is_cancelled() => {
                                self.save(&bundle, &name, index, progress).await?;
                                return Err(RunBatchError::Cancelled);
                            }
                            Err(error) => failed_records(&pending, error.to_string()),
                        }
                    }
                    Err(error) => {
                        warn!("Cannot load item {} of {}: {}", index, name, error);
                        failed_records(&pending, error.to_string())
                    }
                };

                let failed = records.iter().any(|(_, record)| record.is_failed());
                for (variant, record) in records {
                    bundle.append(variant, &name, record);
                }
                summary.processed += 1;
                if failed {
                    summary.failed += 1;
                }
                progress.on_item_complete(&name, index, failed);

                if self.checkpoint_every > 0 && (index + 1) % self.checkpoint_every == 0 {
                    self.save(&bundle, &name, index + 1, progress).await?;
                }
            }

            self.save(&bundle, &name, total, progress).await?;
            progress.on_dataset_complete(&name);
        }

        summary.bundle = bundle;
        Ok(summary)
    }

    async fn save(
        &self,
        bundle: &CheckpointBundle,
        dataset: &str,
        items: usize,
        progress: &dyn DiscussionProgress,
    ) -> Result<(), CheckpointError> {
        self.store.save(bundle).await?;
        let location = self.store.location();
        info!("Checkpoint saved to {} ({} items of {})", location, items, dataset);
        self.session.gateway().logger().log(ConversationEvent::new(
            event_type::CHECKPOINT,
            json!({
                "location": location,
                "dataset": dataset,
                "items": items,
            }),
        ));
        progress.on_checkpoint(&location, items);
        Ok(())
    }
}

fn failed_records(variants: &[VariantKey], message: String) -> Vec<(VariantKey, SessionRecord)> {
    variants
        .iter()
        .map(|variant| (*variant, SessionRecord::failed(message.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiscussionParams, RetryLimits};
    use crate::use_cases::generate::GenerationGateway;
    use crate::use_cases::test_support::{
        MemoryCheckpointStore, MemoryDataset, RecordingLogger, ResponderModel,
        StaticRetrieverFactory,
    };
    use mods_domain::{DiscussionPoint, DiscussionState, Query};

    const PLAN: &str = r#"{"discussion point 1": "Air quality"}"#;
    const FACTS: &str = r#"{"discussion point": "Air quality", "yes facts": ["a"], "no facts": []}"#;

    /// Items whose query mentions "poison" never get a topic plan.
    fn model() -> ResponderModel {
        ResponderModel::new(|prompt| {
            if prompt.contains("fine-grained discussion points") {
                if prompt.contains("poison") {
                    Ok("no idea".to_string())
                } else {
                    Ok(PLAN.to_string())
                }
            } else if prompt.contains("relevant documents") {
                Ok(r#"{"relevant documents": [1]}"#.to_string())
            } else {
                Ok(FACTS.to_string())
            }
        })
    }

    fn params() -> DiscussionParams {
        DiscussionParams::default()
            .with_topic_count(1)
            .with_subtopic_retrieval(false)
    }

    fn batch(store: Arc<MemoryCheckpointStore>, checkpoint_every: usize) -> RunBatchUseCase {
        batch_with(store, checkpoint_every, params())
    }

    fn batch_with(
        store: Arc<MemoryCheckpointStore>,
        checkpoint_every: usize,
        params: DiscussionParams,
    ) -> RunBatchUseCase {
        let limits = RetryLimits {
            semantic_attempts: 1,
            selection_attempts: 1,
            session_attempts: 1,
            checkpoint_every,
            ..RetryLimits::default()
        };
        let session = RunSessionUseCase::new(
            GenerationGateway::new(Arc::new(model())),
            Arc::new(StaticRetrieverFactory::default()),
            params,
            limits,
        );
        RunBatchUseCase::new(session, store, limits.checkpoint_every)
    }

    fn completed(query: &str, topic: &str) -> SessionRecord {
        let mut state = DiscussionState::new(Query::new(query));
        state.set_topics(vec![DiscussionPoint::from(topic)]).unwrap();
        SessionRecord::completed(state)
    }

    fn query_of(record: &SessionRecord) -> &str {
        record.state().unwrap().query().content()
    }

    #[tokio::test]
    async fn test_failed_item_does_not_stop_batch() {
        let store = Arc::new(MemoryCheckpointStore::default());
        let dataset: Arc<dyn Dataset> =
            Arc::new(MemoryDataset::new("debates", &["ban cars?", "poison wells?", "tax sugar?"]));
        let summary = batch(store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap();

        let records = summary.bundle.records(VariantKey::default(), "debates");
        assert_eq!(records.len(), 3);
        assert!(!records[0].is_failed());
        assert!(records[1].is_failed());
        assert!(!records[2].is_failed());
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_checkpoint_cadence() {
        let store = Arc::new(MemoryCheckpointStore::default());
        let logger = Arc::new(RecordingLogger::default());
        let dataset: Arc<dyn Dataset> =
            Arc::new(MemoryDataset::new("debates", &["a?", "b?", "c?", "d?", "e?"]));
        let limits = RetryLimits {
            checkpoint_every: 2,
            ..RetryLimits::default()
        };
        let session = RunSessionUseCase::new(
            GenerationGateway::new(Arc::new(model())).with_logger(logger.clone()),
            Arc::new(StaticRetrieverFactory::default()),
            DiscussionParams::default().with_topic_count(1),
            limits,
        );
        RunBatchUseCase::new(session, store.clone(), 2)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap();

        // After items 2 and 4, then at the end of the dataset.
        let sizes: Vec<usize> = store
            .saves()
            .iter()
            .map(|b| b.records(VariantKey::default(), "debates").len())
            .collect();
        assert_eq!(sizes, vec![2, 4, 5]);
        assert_eq!(logger.count(event_type::CHECKPOINT), 3);
    }

    #[tokio::test]
    async fn test_resume_skips_recorded_items() {
        let mut existing = CheckpointBundle::new("run");
        existing.append(
            VariantKey::default(),
            "debates",
            SessionRecord::completed(DiscussionState::new(Query::new("earlier"))),
        );
        let store = Arc::new(MemoryCheckpointStore::with_bundle(existing));
        let dataset: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("debates", &["a?", "b?"]));

        let summary = batch(store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed, 1);
        let records = summary.bundle.records(VariantKey::default(), "debates");
        assert_eq!(records[0].state().unwrap().query().content(), "earlier");
        assert_eq!(records[1].state().unwrap().query().content(), "b?");
    }

    #[tokio::test]
    async fn test_smaller_num_to_run_keeps_recorded_items() {
        let mut existing = CheckpointBundle::new("run");
        for query in ["a?", "b?", "c?"] {
            existing.append(VariantKey::default(), "debates", completed(query, "Cost"));
        }
        let store = Arc::new(MemoryCheckpointStore::with_bundle(existing));
        let dataset: Arc<dyn Dataset> =
            Arc::new(MemoryDataset::new("debates", &["a?", "b?", "c?"]));

        let summary = batch(store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]).with_num_to_run(1))
            .await
            .unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.bundle.records(VariantKey::default(), "debates").len(), 3);
        let saved = store.saves().pop().unwrap();
        assert_eq!(saved.records(VariantKey::default(), "debates").len(), 3);
    }

    #[tokio::test]
    async fn test_added_variant_runs_only_missing_records() {
        let recorded = VariantKey::default();
        let added = VariantKey::new(false, true);
        let mut existing = CheckpointBundle::new("run");
        existing.append(recorded, "debates", completed("earlier a", "Recorded topic"));
        existing.append(recorded, "debates", completed("earlier b", "Recorded topic"));
        let store = Arc::new(MemoryCheckpointStore::with_bundle(existing));
        let dataset: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("debates", &["a?", "b?"]));

        let summary = batch_with(
            store.clone(),
            10,
            params().with_variants(vec![recorded, added]),
        )
        .execute(RunBatchInput::new("run", vec![dataset]))
        .await
        .unwrap();

        let kept = summary.bundle.records(recorded, "debates");
        assert_eq!(kept.len(), 2);
        assert_eq!(query_of(&kept[0]), "earlier a");
        assert_eq!(query_of(&kept[1]), "earlier b");

        let new = summary.bundle.records(added, "debates");
        assert_eq!(new.len(), 2);
        assert_eq!(query_of(&new[1]), "b?");
        // The added variant discusses the plan already on record.
        let topics: Vec<_> = new[0].state().unwrap().topics().cloned().collect();
        assert_eq!(topics, vec![DiscussionPoint::from("Recorded topic")]);
        assert_eq!(summary.processed, 2);
    }

    #[tokio::test]
    async fn test_checkpoint_with_other_settings_is_refused() {
        let stored = params().with_select_agents(false).run_settings();
        let mut existing = CheckpointBundle::new("run").with_settings(stored);
        existing.append(VariantKey::default(), "debates", completed("a?", "Cost"));
        let store = Arc::new(MemoryCheckpointStore::with_bundle(existing));
        let dataset: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("debates", &["a?", "b?"]));

        let error = batch(store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap_err();

        match error {
            RunBatchError::SettingsMismatch { stored: s, current, .. } => {
                assert_eq!(s, stored);
                assert_eq!(current, params().run_settings());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.saves().is_empty());
    }

    #[tokio::test]
    async fn test_settings_stamped_on_saved_bundle() {
        let store = Arc::new(MemoryCheckpointStore::default());
        let dataset: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("debates", &["a?"]));
        batch(store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap();
        assert_eq!(
            store.saves().pop().unwrap().settings,
            Some(params().run_settings())
        );
    }

    #[tokio::test]
    async fn test_num_to_run_bounds_each_dataset() {
        let store = Arc::new(MemoryCheckpointStore::default());
        let first: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("first", &["a?", "b?", "c?"]));
        let second: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("second", &["d?"]));
        let summary = batch(store, 10)
            .execute(RunBatchInput::new("run", vec![first, second]).with_num_to_run(2))
            .await
            .unwrap();
        assert_eq!(summary.bundle.records(VariantKey::default(), "first").len(), 2);
        assert_eq!(summary.bundle.records(VariantKey::default(), "second").len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_batch_saves_progress() {
        let token = tokio_util::sync::CancellationToken::new();
        token.cancel();
        let store = Arc::new(MemoryCheckpointStore::default());
        let session = RunSessionUseCase::new(
            GenerationGateway::new(Arc::new(model())).with_cancellation(token),
            Arc::new(StaticRetrieverFactory::default()),
            DiscussionParams::default(),
            RetryLimits::default(),
        );
        let dataset: Arc<dyn Dataset> = Arc::new(MemoryDataset::new("debates", &["a?"]));
        let error = RunBatchUseCase::new(session, store.clone(), 10)
            .execute(RunBatchInput::new("run", vec![dataset]))
            .await
            .unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(store.saves().len(), 1);
    }
}

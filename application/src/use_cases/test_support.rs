//! Scripted in-memory collaborators for use case tests.

use crate::ports::checkpoint::{CheckpointError, CheckpointStore};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::dataset::{Dataset, DatasetError, DatasetItem};
use crate::ports::language_model::{LanguageModel, ModelError};
use crate::ports::retriever::{
    CandidateSet, DocumentCandidates, RetrievalError, Retriever, RetrieverFactory,
};
use async_trait::async_trait;
use mods_domain::{CheckpointBundle, Document, Query};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&str) -> Result<String, ModelError> + Send + Sync>;

/// Model that replays a script, then falls back to a fixed reply (or a
/// fatal error when there is none).
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: Option<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(reply: &str) -> Self {
        Self {
            fallback: Some(reply.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| ModelError::Fatal("script exhausted".to_string()))
    }
}

/// Model that answers by inspecting the prompt.
pub struct ResponderModel {
    respond: Responder,
    calls: AtomicUsize,
}

impl ResponderModel {
    pub fn new(
        respond: impl Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ResponderModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(prompt)
    }
}

/// Retriever that returns passages in stored order.
pub struct StaticRetriever {
    documents: Vec<Document>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn document_count(&self) -> usize {
        self.documents.len()
    }

    async fn top_passages(
        &self,
        document: usize,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        let doc = self
            .documents
            .get(document)
            .ok_or(RetrievalError::DocumentOutOfRange {
                document,
                count: self.documents.len(),
            })?;
        Ok(doc.passages().iter().take(k).cloned().collect())
    }

    async fn best_candidates(&self, query: &str, k: usize) -> Result<CandidateSet, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(CandidateSet {
            documents: self
                .documents
                .iter()
                .map(|d| DocumentCandidates {
                    document: d.index(),
                    passages: d.passages().iter().take(k).cloned().collect(),
                    score: 1.0,
                })
                .collect(),
        })
    }
}

#[derive(Default)]
pub struct StaticRetrieverFactory {
    built: AtomicUsize,
}

impl StaticRetrieverFactory {
    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl RetrieverFactory for StaticRetrieverFactory {
    fn build(&self, documents: &[Document]) -> Result<Arc<dyn Retriever>, RetrievalError> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StaticRetriever::new(documents.to_vec())))
    }
}

/// Two short documents that disagree about banning cars.
pub fn two_documents() -> Vec<Document> {
    Document::collection(vec![
        vec![
            "Car bans cut pollution.".to_string(),
            "Transit is cheaper.".to_string(),
        ],
        vec![
            "Car bans hurt shops.".to_string(),
            "Commutes get longer.".to_string(),
        ],
    ])
}

pub struct MemoryDataset {
    name: String,
    items: Vec<DatasetItem>,
}

impl MemoryDataset {
    pub fn new(name: &str, queries: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            items: queries
                .iter()
                .map(|q| DatasetItem::new(Query::new(*q), two_documents()))
                .collect(),
        }
    }
}

impl Dataset for MemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn get_item(&self, index: usize) -> Result<DatasetItem, DatasetError> {
        self.items
            .get(index)
            .cloned()
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
    }
}

#[derive(Default)]
pub struct MemoryCheckpointStore {
    saved: Mutex<Option<CheckpointBundle>>,
    saves: Mutex<Vec<CheckpointBundle>>,
}

impl MemoryCheckpointStore {
    pub fn with_bundle(bundle: CheckpointBundle) -> Self {
        Self {
            saved: Mutex::new(Some(bundle)),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Every bundle passed to `save`, in order.
    pub fn saves(&self) -> Vec<CheckpointBundle> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self) -> Result<Option<CheckpointBundle>, CheckpointError> {
        Ok(self.saved.lock().unwrap().clone())
    }

    async fn save(&self, bundle: &CheckpointBundle) -> Result<(), CheckpointError> {
        *self.saved.lock().unwrap() = Some(bundle.clone());
        self.saves.lock().unwrap().push(bundle.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<ConversationEvent>>,
}

impl RecordingLogger {
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

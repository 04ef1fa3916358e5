//! Speaker
//!
//! One speaker per document. A speaker only ever sees its own document
//! (through the retriever or the budget-pruned passage list) and reports
//! supporting and opposing facts for a topic.

use crate::ports::retriever::Retriever;
use crate::use_cases::generate::GenerationGateway;
use crate::use_cases::run_session::DiscussionError;
use mods_domain::{
    Document, Fact, FactReport, Query, SchemaError, SpeakerPrompt, TokenBudget, join_passages,
    render_documents,
};
use std::sync::Arc;
use tracing::debug;

pub struct Speaker {
    document: Document,
    gateway: GenerationGateway,
    retriever: Arc<dyn Retriever>,
    budget: TokenBudget,
}

impl Speaker {
    pub fn new(
        document: Document,
        gateway: GenerationGateway,
        retriever: Arc<dyn Retriever>,
        budget: TokenBudget,
    ) -> Self {
        Self {
            document,
            gateway,
            retriever,
            budget,
        }
    }

    pub fn document(&self) -> usize {
        self.document.index()
    }

    /// Facts from the `top_k` passages most relevant to `search_query`,
    /// which is either the topic itself or a moderator sub-question. The
    /// passages are pruned to the token budget in rank order.
    pub async fn elicit(
        &self,
        query: &Query,
        topic: &str,
        search_query: &str,
        top_k: usize,
    ) -> Result<Option<FactReport>, DiscussionError> {
        let passages = self
            .retriever
            .top_passages(self.document.index(), search_query, top_k)
            .await?;
        let kept = self.budget.prune(&passages);
        if kept.len() < passages.len() {
            debug!(
                "Retrieved context of document {} pruned to {} of {} passages",
                self.document.citation_number(),
                kept.len(),
                passages.len()
            );
        }
        let context = join_passages(kept);
        let prompt = SpeakerPrompt::elicit(query.content(), topic, search_query, &context);
        self.request_facts(&prompt).await
    }

    /// Facts from the whole document, pruned to the token budget.
    pub async fn elicit_full_document(
        &self,
        query: &Query,
        topic: &str,
        rationale: Option<&str>,
    ) -> Result<Option<FactReport>, DiscussionError> {
        let kept = self.budget.prune(self.document.passages());
        if kept.len() < self.document.passages().len() {
            debug!(
                "Document {} pruned to {} of {} passages",
                self.document.citation_number(),
                kept.len(),
                self.document.passages().len()
            );
        }
        let text = self.budget.pruned_text(self.document.passages());
        let prompt = SpeakerPrompt::elicit_full_document(query.content(), topic, &text, rationale);
        self.request_facts(&prompt).await
    }

    async fn request_facts(&self, prompt: &str) -> Result<Option<FactReport>, DiscussionError> {
        let report = self
            .gateway
            .generate(prompt, &FactReport::field_names(), FactReport::from_fields)
            .await?;
        if let Some(report) = &report {
            debug!(
                "Document {} reported {} facts",
                self.document.citation_number(),
                report.fact_count()
            );
        }
        Ok(report)
    }
}

/// Facts drawn from several documents in one request. Each fact must cite
/// its document as `[N]`; a report with an uncited fact is rejected and
/// regenerated like any other contract violation.
pub async fn elicit_with_citations(
    gateway: &GenerationGateway,
    query: &Query,
    topic: &str,
    passages: &[(usize, Vec<String>)],
) -> Result<Option<FactReport>, DiscussionError> {
    let context = render_documents(passages.iter().map(|(doc, p)| (*doc, p.as_slice())));
    let prompt = SpeakerPrompt::elicit_with_citations(query.content(), topic, &context);
    let report = gateway
        .generate(&prompt, &FactReport::field_names(), |fields| {
            let report = FactReport::from_fields(fields)?;
            Fact::from_cited_report(&report).map_err(|error| SchemaError::Malformed {
                field: FactReport::YES_FACTS.to_string(),
                reason: error.to_string(),
            })?;
            Ok(report)
        })
        .await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{ScriptedModel, StaticRetriever, two_documents};
    use mods_domain::{DiscussionPoint, DiscussionState, SpeakerAssignment};

    fn speaker(model: Arc<ScriptedModel>, document: usize, budget: TokenBudget) -> (Speaker, Arc<StaticRetriever>) {
        let documents = two_documents();
        let retriever = Arc::new(StaticRetriever::new(documents.clone()));
        let speaker = Speaker::new(
            documents[document].clone(),
            GenerationGateway::new(model),
            retriever.clone(),
            budget,
        );
        (speaker, retriever)
    }

    const REPORT: &str = r#"{"discussion point": "Air quality", "yes facts": ["Bans cut pollution."], "no facts": []}"#;

    #[tokio::test]
    async fn test_elicit_searches_own_document() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPORT.to_string())]));
        let (speaker, retriever) = speaker(model.clone(), 0, TokenBudget::default());
        let report = speaker
            .elicit(&Query::new("Ban cars?"), "Air quality", "Is the air cleaner?", 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.supporting, vec!["Bans cut pollution."]);
        assert_eq!(retriever.queries(), vec!["Is the air cleaner?"]);

        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Document:\nCar bans cut pollution.\n"));
        assert!(!prompt.contains("Transit is cheaper."));
        assert!(prompt.contains("sub-question \"Is the air cleaner?\""));
    }

    #[tokio::test]
    async fn test_elicit_prunes_retrieved_passages_to_budget() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPORT.to_string())]));
        // The top passage alone crosses a one-token budget.
        let (speaker, _) = speaker(model.clone(), 0, TokenBudget::new(1));
        speaker
            .elicit(&Query::new("Ban cars?"), "Air quality", "Air quality", 2)
            .await
            .unwrap()
            .unwrap();
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Car bans cut pollution."));
        assert!(!prompt.contains("Transit is cheaper."));
    }

    #[tokio::test]
    async fn test_elicit_none_after_contract_violations() {
        let model = Arc::new(ScriptedModel::repeating("Nothing to report."));
        let (speaker, _) = speaker(model.clone(), 1, TokenBudget::default());
        let report = speaker
            .elicit(&Query::new("Ban cars?"), "Cost", "Cost", 2)
            .await
            .unwrap();
        assert_eq!(report, None);
        assert_eq!(model.calls(), 5);
    }

    #[tokio::test]
    async fn test_full_document_respects_budget() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(REPORT.to_string())]));
        // First passage alone exceeds the budget, so only it is kept.
        let (speaker, _) = speaker(model.clone(), 1, TokenBudget::new(1));
        speaker
            .elicit_full_document(&Query::new("Ban cars?"), "Cost", Some("Talks about shops"))
            .await
            .unwrap()
            .unwrap();
        let prompt = &model.prompts()[0];
        assert!(prompt.contains("Car bans hurt shops."));
        assert!(!prompt.contains("Commutes get longer."));
        assert!(prompt.ends_with("Talks about shops"));
        assert_eq!(speaker.document(), 1);
    }

    #[tokio::test]
    async fn test_citations_required_and_recorded() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(r#"{"discussion point": "Cost", "yes facts": ["Transit is cheaper."], "no facts": []}"#.to_string()),
            Ok(r#"{"discussion point": "Cost", "yes facts": ["Transit is cheaper [1]."], "no facts": ["Shops lose sales [2]."]}"#.to_string()),
        ]));
        let gateway = GenerationGateway::new(model.clone());
        let passages = vec![
            (0, vec!["Transit is cheaper.".to_string()]),
            (1, vec!["Shops lose sales.".to_string()]),
        ];
        let report = elicit_with_citations(&gateway, &Query::new("Ban cars?"), "Cost", &passages)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(model.calls(), 2);
        assert!(model.prompts()[0].contains("Document 2: Shops lose sales."));

        let mut state = DiscussionState::new(Query::new("Ban cars?"));
        state.set_topics(vec![DiscussionPoint::from("Cost")]).unwrap();
        state.record_selection(0, SpeakerAssignment::everyone(2)).unwrap();
        assert_eq!(state.record_cited_facts(0, &report), Ok(2));
        let facts = state.facts(0).unwrap();
        assert_eq!(facts[0].claim, "Transit is cheaper.");
        assert_eq!(facts[1].document, 1);
    }
}

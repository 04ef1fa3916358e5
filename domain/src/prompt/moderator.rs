//! Prompts for the moderator agent

use crate::contract::{Abstention, RouteDecision, SelectionResult, TopicProposal};
use crate::discussion::SelectionDetail;

const TOPIC_GUIDELINES: &str = "Each discussion point should be short, around five words, and \
much more specific than the query, naming a high-level theme or argument. Avoid broad labels \
such as 'Impacts' or 'Benefits'. ";

/// Templates for every moderator request
pub struct ModeratorPrompt;

impl ModeratorPrompt {
    /// Fixed-count topic planning over retrieved candidate passages.
    pub fn plan_topics(query: &str, context: &str, keys: &[String]) -> String {
        let key_list = keys
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n\
             From these documents, produce {count} fine-grained discussion points. \
             {TOPIC_GUIDELINES}All discussion points must be unique. \
             Your final output must be a JSON dictionary with keys for {key_list}.",
            count = keys.len(),
        )
    }

    /// Open-ended planning: three central points plus optional extras.
    pub fn propose_topics(query: &str, context: &str, topic_count: usize) -> String {
        let extra = topic_count.saturating_sub(3);
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n\
             From these documents, propose three fine-grained discussion points that together \
             cover nearly all of their content without favoring any side. Then propose up to \
             {extra} further points a reader may also care about; propose fewer if everything \
             is already covered. {TOPIC_GUIDELINES}All discussion points must be unique. \
             Your final output must be a JSON dictionary with the key \"{important}\" holding a \
             list of the three central points, and the key \"{other}\" holding a list of the \
             other points.",
            important = TopicProposal::IMPORTANT_POINTS,
            other = TopicProposal::OTHER_POINTS,
        )
    }

    /// Speaker selection for one topic, optionally asking for a per-document
    /// rationale or sub-question.
    pub fn select_speakers(topic: &str, context: &str, detail: SelectionDetail) -> String {
        let mut prompt = format!(
            "The following documents relate to the discussion point: {topic}\n{context}\n\n\
             From these documents, decide which ones contain relevant information or distinct \
             perspectives on \"{topic}\". Your final output must be a JSON dictionary with a key \
             for \"{relevant}\" holding a list of the integer numbers of the relevant documents. ",
            relevant = SelectionResult::RELEVANT_DOCUMENTS,
        );
        match detail {
            SelectionDetail::None => prompt.push_str("Do not include any reasoning."),
            SelectionDetail::Rationale => prompt.push_str(
                "Think step by step, and for each relevant document include its rationale under \
                 the key \"Document N Rationale\", where N is that document's number.",
            ),
            SelectionDetail::Question => prompt.push_str(&format!(
                "For each relevant document, write one very short question the document is an \
                 expert in, capturing its perspective on \"{topic}\". Put each question under the \
                 key \"Document N Question\", where N is that document's number."
            )),
        }
        prompt
    }

    /// Classify whether the documents disagree on the query.
    pub fn route_query(query: &str, context: &str) -> String {
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n\
             Classify whether the documents present conflicting perspectives on the query. \
             Answer \"opposing\" if they give opposing answers, \"not opposing\" if there is a \
             single main answer, and \"unanswerable\" if they do not answer the query at all. \
             Your final output must only be a JSON dictionary with the key \"{label}\" for the \
             answer type and the key \"{reasoning}\" for a one-sentence justification.",
            label = RouteDecision::LABEL,
            reasoning = RouteDecision::REASONING,
        )
    }

    /// Short cited answer for a query without conflicting perspectives.
    pub fn answer_query(query: &str, context: &str) -> String {
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n\
             Summarize an answer to the query in at most three sentences. Every sentence must \
             cite its source documents as numbers inside square brackets. Use only the documents \
             relevant to the query. Your final output must be a JSON dictionary with the key \
             \"{summary}\".",
            summary = Abstention::SUMMARY,
        )
    }

    /// Explain why the query is unanswerable and suggest answerable ones.
    pub fn abstain(query: &str, context: &str) -> String {
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n\
             In fewer than three sentences, explain why the documents cannot answer this query. \
             Then suggest up to three closely related questions that at least one document can \
             answer, each citing that document as a number inside square brackets. Your final \
             output must be a JSON dictionary with the key \"{summary}\" for the explanation and \
             the key \"{questions}\" for the list of cited questions.",
            summary = Abstention::SUMMARY,
            questions = Abstention::QUESTIONS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TopicPlan;

    #[test]
    fn test_plan_topics_lists_every_key() {
        let prompt = ModeratorPrompt::plan_topics("Ban cars?", "Document 1: x", &TopicPlan::field_names(3));
        assert!(prompt.contains("produce 3 fine-grained"));
        assert!(prompt.contains("\"discussion point 1\", \"discussion point 2\", \"discussion point 3\""));
        assert!(prompt.contains("Document 1: x"));
    }

    #[test]
    fn test_propose_topics_extra_count() {
        let prompt = ModeratorPrompt::propose_topics("q", "c", 5);
        assert!(prompt.contains("up to 2 further"));
        let prompt = ModeratorPrompt::propose_topics("q", "c", 1);
        assert!(prompt.contains("up to 0 further"));
    }

    #[test]
    fn test_select_speakers_detail_instructions() {
        let plain = ModeratorPrompt::select_speakers("Cost", "c", SelectionDetail::None);
        assert!(plain.contains("Do not include any reasoning"));
        let question = ModeratorPrompt::select_speakers("Cost", "c", SelectionDetail::Question);
        assert!(question.contains("Document N Question"));
        let rationale = ModeratorPrompt::select_speakers("Cost", "c", SelectionDetail::Rationale);
        assert!(rationale.contains("Document N Rationale"));
    }
}

//! Prompts for per-document speakers

use crate::contract::FactReport;

/// Templates for fact elicitation
pub struct SpeakerPrompt;

impl SpeakerPrompt {
    fn fact_instructions(topic: &str, focus: &str, cite: bool) -> String {
        let citation = if cite {
            "Each fact must cite the document it came from as a number inside square brackets. "
        } else {
            ""
        };
        format!(
            "Using the document, write two lists of factual, self-contained sentences about the \
             query: a \"yes\" list with facts explaining why the answer under the discussion \
             point is yes, and a \"no\" list with facts explaining why it is no. Leave a list \
             empty when no such fact exists. {citation}Only include facts directly related to the \
             discussion point \"{topic}\"{focus}. Your output must be a JSON dictionary with the \
             key \"{point}\" for the discussion point, \"{yes}\" for the list of yes facts, and \
             \"{no}\" for the list of no facts.",
            point = FactReport::DISCUSSION_POINT,
            yes = FactReport::YES_FACTS,
            no = FactReport::NO_FACTS,
        )
    }

    /// Facts from retrieved passages of one document. The sub-question is
    /// only mentioned when it differs from the topic.
    pub fn elicit(query: &str, topic: &str, search_query: &str, context: &str) -> String {
        let focus = if search_query == topic {
            String::new()
        } else {
            format!(" and the sub-question \"{}\"", search_query)
        };
        format!(
            "The following is a document related to the query: {query}\nDocument:\n{context}\n\n{}",
            Self::fact_instructions(topic, &focus, false)
        )
    }

    /// Facts from a whole (budget-pruned) document, with the moderator's
    /// rationale appended when one exists.
    pub fn elicit_full_document(
        query: &str,
        topic: &str,
        document: &str,
        rationale: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            "The following is a document related to the query: {query}\nDocument:\n{document}\n\n{}",
            Self::fact_instructions(topic, "", false)
        );
        if let Some(rationale) = rationale {
            prompt.push_str(&format!(
                "\n\nA moderator chose you for this discussion point for the following reason: {}",
                rationale
            ));
        }
        prompt
    }

    /// Facts drawn from several documents at once; every fact carries a
    /// `[N]` citation.
    pub fn elicit_with_citations(query: &str, topic: &str, context: &str) -> String {
        format!(
            "The following documents relate to the query: {query}\n{context}\n\n{}",
            Self::fact_instructions(topic, "", true)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_question_only_when_different() {
        let same = SpeakerPrompt::elicit("q", "Cost", "Cost", "passages");
        assert!(!same.contains("sub-question"));
        let differs = SpeakerPrompt::elicit("q", "Cost", "Is transit cheaper?", "passages");
        assert!(differs.contains("the sub-question \"Is transit cheaper?\""));
    }

    #[test]
    fn test_full_document_rationale() {
        let without = SpeakerPrompt::elicit_full_document("q", "Cost", "doc", None);
        assert!(!without.contains("moderator"));
        let with = SpeakerPrompt::elicit_full_document("q", "Cost", "doc", Some("talks about fares"));
        assert!(with.ends_with("talks about fares"));
    }

    #[test]
    fn test_citation_prompt_requires_markers() {
        let prompt = SpeakerPrompt::elicit_with_citations("q", "Cost", "Document 1: a");
        assert!(prompt.contains("square brackets"));
        assert!(prompt.contains("\"yes facts\""));
    }
}

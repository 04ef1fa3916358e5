//! In-process BM25 retrieval.
//!
//! Every document gets its own index over its passages, so term rarity is
//! judged within the document being searched. Scores use the non-negative
//! IDF form `ln((N - n + 0.5) / (n + 0.5) + 1)`. Ties keep passage order.

use async_trait::async_trait;
use mods_application::ports::retriever::{
    CandidateSet, DocumentCandidates, RetrievalError, Retriever, RetrieverFactory,
};
use mods_domain::Document;
use std::collections::HashMap;
use std::sync::Arc;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Term statistics of one document's passages.
#[derive(Debug, Clone)]
struct PassageIndex {
    passages: Vec<String>,
    term_freqs: Vec<HashMap<String, u32>>,
    lengths: Vec<usize>,
    /// Passages containing each term.
    doc_freqs: HashMap<String, u32>,
    avg_length: f64,
}

impl PassageIndex {
    fn new(passages: &[String]) -> Self {
        let mut term_freqs = Vec::with_capacity(passages.len());
        let mut lengths = Vec::with_capacity(passages.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();

        for passage in passages {
            let tokens = tokenize(passage);
            lengths.push(tokens.len());
            let mut counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for token in counts.keys() {
                *doc_freqs.entry(token.clone()).or_insert(0) += 1;
            }
            term_freqs.push(counts);
        }

        let total: usize = lengths.iter().sum();
        let avg_length = if lengths.is_empty() {
            0.0
        } else {
            total as f64 / lengths.len() as f64
        };

        Self {
            passages: passages.to_vec(),
            term_freqs,
            lengths,
            doc_freqs,
            avg_length,
        }
    }

    fn score(&self, passage: usize, query_tokens: &[String]) -> f64 {
        let n_passages = self.passages.len() as f64;
        let norm = 1.0 - B + B * (self.lengths[passage] as f64 / self.avg_length.max(1.0));
        query_tokens
            .iter()
            .filter_map(|token| {
                let tf = *self.term_freqs[passage].get(token)? as f64;
                let n = *self.doc_freqs.get(token)? as f64;
                let idf = ((n_passages - n + 0.5) / (n + 0.5) + 1.0).ln();
                Some(idf * (tf * (K1 + 1.0)) / (tf + K1 * norm))
            })
            .sum()
    }

    /// `(passage index, score)` pairs, best first, at most `k`.
    fn ranked(&self, query: &str, k: usize) -> Vec<(usize, f64)> {
        let query_tokens = tokenize(query);
        let mut scored: Vec<(usize, f64)> = (0..self.passages.len())
            .map(|i| (i, self.score(i, &query_tokens)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }

    fn top(&self, query: &str, k: usize) -> (Vec<String>, f64) {
        let ranked = self.ranked(query, k);
        let best = ranked.first().map(|(_, score)| *score).unwrap_or(0.0);
        let passages = ranked
            .into_iter()
            .map(|(i, _)| self.passages[i].clone())
            .collect();
        (passages, best)
    }
}

/// BM25 retriever over one item's documents.
#[derive(Debug, Clone)]
pub struct LexicalRetriever {
    indexes: Vec<PassageIndex>,
}

impl LexicalRetriever {
    pub fn new(documents: &[Document]) -> Self {
        Self {
            indexes: documents
                .iter()
                .map(|d| PassageIndex::new(d.passages()))
                .collect(),
        }
    }

    fn index(&self, document: usize) -> Result<&PassageIndex, RetrievalError> {
        self.indexes
            .get(document)
            .ok_or(RetrievalError::DocumentOutOfRange {
                document,
                count: self.indexes.len(),
            })
    }
}

#[async_trait]
impl Retriever for LexicalRetriever {
    fn document_count(&self) -> usize {
        self.indexes.len()
    }

    async fn top_passages(
        &self,
        document: usize,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, RetrievalError> {
        Ok(self.index(document)?.top(query, k).0)
    }

    async fn best_candidates(&self, query: &str, k: usize) -> Result<CandidateSet, RetrievalError> {
        let documents = self
            .indexes
            .iter()
            .enumerate()
            .map(|(document, index)| {
                let (passages, score) = index.top(query, k);
                DocumentCandidates {
                    document,
                    passages,
                    score,
                }
            })
            .collect();
        Ok(CandidateSet { documents })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalRetrieverFactory;

impl RetrieverFactory for LexicalRetrieverFactory {
    fn build(&self, documents: &[Document]) -> Result<Arc<dyn Retriever>, RetrievalError> {
        Ok(Arc::new(LexicalRetriever::new(documents)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents() -> Vec<Document> {
        Document::collection(vec![
            vec![
                "The council met on Tuesday.".to_string(),
                "Air pollution fell after the car ban.".to_string(),
                "Pollution pollution everywhere, said one resident.".to_string(),
            ],
            vec![
                "Shops lost customers during the ban.".to_string(),
                "Parking revenue dropped.".to_string(),
            ],
            vec![],
        ])
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Car-free, 2024!"), vec!["car", "free", "2024"]);
        assert!(tokenize(" ... ").is_empty());
    }

    #[tokio::test]
    async fn test_top_passages_ranks_matching_passages_first() {
        let retriever = LexicalRetriever::new(&documents());
        let top = retriever.top_passages(0, "air pollution", 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], "Air pollution fell after the car ban.");
        assert!(!top.contains(&"The council met on Tuesday.".to_string()));
    }

    #[tokio::test]
    async fn test_unmatched_query_keeps_passage_order() {
        let retriever = LexicalRetriever::new(&documents());
        let top = retriever.top_passages(1, "zebra", 5).await.unwrap();
        assert_eq!(
            top,
            vec!["Shops lost customers during the ban.", "Parking revenue dropped."]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_document() {
        let retriever = LexicalRetriever::new(&documents());
        let error = retriever.top_passages(7, "ban", 1).await.unwrap_err();
        assert_eq!(
            error,
            RetrievalError::DocumentOutOfRange {
                document: 7,
                count: 3
            }
        );
    }

    #[tokio::test]
    async fn test_best_candidates_covers_every_document() {
        let retriever = LexicalRetrieverFactory.build(&documents()).unwrap();
        let set = retriever.best_candidates("ban", 1).await.unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.documents[1].passages, vec!["Shops lost customers during the ban."]);
        assert!(set.documents[0].score > 0.0);
        assert!(set.documents[2].passages.is_empty());
        assert_eq!(set.documents[2].score, 0.0);
        assert!(set.render().starts_with("Document 1: Air pollution fell"));
    }
}

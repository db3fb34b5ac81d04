//! Domain classifier.
//!
//! Decides whether a query belongs to the documentation domain. The primary
//! signal is nearest-neighbor distance against the evidence store; when
//! that lookup fails, a deterministic keyword-containment check takes over
//! so classification never errors.

use crate::store::EvidenceStore;
use std::sync::Arc;

/// Two-tier in-domain classifier.
pub struct DomainClassifier {
    store: Arc<EvidenceStore>,
    /// Cosine distance below which a query counts as in-domain. Tighter
    /// than the retrieval threshold: misrouting a general query into the
    /// documentation path is cheaper than the reverse.
    threshold: f32,
    keywords: Vec<String>,
}

impl DomainClassifier {
    pub fn new(store: Arc<EvidenceStore>, threshold: f32, keywords: Vec<String>) -> Self {
        Self {
            store,
            threshold,
            keywords,
        }
    }

    /// Classify a query as in-domain or general. Never errors.
    pub fn classify(&self, query: &str) -> bool {
        match self.store.query(query, 1) {
            Ok(matches) => match matches.first() {
                Some(nearest) => {
                    let in_domain = nearest.distance < self.threshold;
                    tracing::debug!(
                        "Query '{}' similarity distance: {:.3}, in-domain: {}",
                        query,
                        nearest.distance,
                        in_domain
                    );
                    in_domain
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("Error in vector similarity check: {}", e);
                self.keyword_match(query)
            }
        }
    }

    /// Keyword-containment fallback over the alphanumeric-and-space
    /// normalized query.
    pub fn keyword_match(&self, query: &str) -> bool {
        let normalized: String = query
            .chars()
            .filter(|c| c.is_alphanumeric() || c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        self.keywords
            .iter()
            .any(|keyword| normalized.contains(&keyword.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::EvidenceChunk;
    use crate::embeddings::{EmbeddingProvider, TrigramEmbedder};
    use duplodocs_core::{AppError, AppResult};

    struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        fn provider_name(&self) -> &str {
            "failing"
        }

        fn dimensions(&self) -> usize {
            384
        }

        fn embed(&self, _text: &str) -> AppResult<Vec<f32>> {
            Err(AppError::Llm("embedding backend down".to_string()))
        }
    }

    fn keywords() -> Vec<String> {
        vec![
            "duplo".to_string(),
            "duplocloud".to_string(),
            "kubernetes".to_string(),
            "tenant".to_string(),
        ]
    }

    #[test]
    fn test_similarity_classification_against_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            EvidenceStore::open(dir.path(), "documentation", Arc::new(TrigramEmbedder::new(384)))
                .unwrap(),
        );
        store
            .upsert(&[EvidenceChunk {
                id: "intro_0".to_string(),
                title: "intro".to_string(),
                path: "intro.md".to_string(),
                content: "DuploCloud automates kubernetes tenant deployment".to_string(),
                chunk_index: 0,
            }])
            .unwrap();

        let classifier = DomainClassifier::new(store, 0.35, keywords());
        assert!(classifier.classify("DuploCloud automates kubernetes tenant deployment"));
        assert!(!classifier.classify("chocolate cake recipe with butter and sugar"));
    }

    #[test]
    fn test_empty_store_classifies_as_general() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            EvidenceStore::open(dir.path(), "documentation", Arc::new(TrigramEmbedder::new(384)))
                .unwrap(),
        );
        let classifier = DomainClassifier::new(store, 0.35, keywords());
        assert!(!classifier.classify("what is duplocloud"));
    }

    #[test]
    fn test_keyword_fallback_when_similarity_lookup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            EvidenceStore::open(dir.path(), "documentation", Arc::new(FailingEmbedder)).unwrap(),
        );
        let classifier = DomainClassifier::new(store, 0.35, keywords());

        // Deterministic: same query, same answer, every call.
        for _ in 0..3 {
            assert!(classifier.classify("What is DuploCloud?"));
            assert!(!classifier.classify("capital of France"));
        }
    }

    #[test]
    fn test_keyword_match_normalizes_punctuation() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            EvidenceStore::open(dir.path(), "documentation", Arc::new(TrigramEmbedder::new(64)))
                .unwrap(),
        );
        let classifier = DomainClassifier::new(store, 0.35, keywords());

        assert!(classifier.keyword_match("how do K8S... wait, Kubernetes! pods work?"));
        assert!(classifier.keyword_match("what's a tenant?"));
        assert!(!classifier.keyword_match("weather in Paris"));
    }
}

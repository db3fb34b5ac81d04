//! Priority-ordered search gateway.

use crate::provider::SearchProvider;
use crate::providers::{DuckDuckGoProvider, SerpApiProvider};
use crate::types::SearchResult;
use duplodocs_core::config::SearchConfig;
use std::sync::Arc;

/// Walks search providers strictly in priority order and returns the first
/// non-empty result list. Providers after a successful one are not tried,
/// and the gateway performs no retries beyond what each adapter does.
pub struct SearchGateway {
    providers: Vec<Arc<dyn SearchProvider>>,
}

impl SearchGateway {
    /// Build a gateway from an explicit provider list (already in priority
    /// order).
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// Build the configured provider set in the configured priority order.
    pub fn from_config(config: &SearchConfig) -> Self {
        let mut providers: Vec<Arc<dyn SearchProvider>> = Vec::new();
        for name in &config.priority {
            match name.as_str() {
                "serpapi" => providers.push(Arc::new(SerpApiProvider::new(
                    config.serpapi.clone(),
                    config,
                ))),
                "duckduckgo" => providers.push(Arc::new(DuckDuckGoProvider::new(
                    config.duckduckgo.clone(),
                    config,
                ))),
                other => {
                    tracing::warn!("Ignoring unknown search provider in priority list: {}", other);
                }
            }
        }
        Self { providers }
    }

    /// Query providers until one yields results.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        for provider in &self.providers {
            if !provider.enabled() {
                tracing::info!("Search provider {} is disabled, skipping", provider.name());
                continue;
            }

            tracing::info!("Attempting search with {}", provider.name());
            let results = provider.search(query).await;
            if !results.is_empty() {
                tracing::info!("Found {} results via {}", results.len(), provider.name());
                return results;
            }
        }

        tracing::warn!("No results found from any search provider");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeProvider {
        name: &'static str,
        enabled: bool,
        results: Vec<SearchResult>,
        calls: AtomicU32,
    }

    impl FakeProvider {
        fn new(name: &'static str, results: Vec<SearchResult>) -> Self {
            Self {
                name,
                enabled: true,
                results,
                calls: AtomicU32::new(0),
            }
        }

        fn disabled(name: &'static str) -> Self {
            let mut provider = Self::new(name, Vec::new());
            provider.enabled = false;
            provider
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl SearchProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn search(&self, _query: &str) -> Vec<SearchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results.clone()
        }
    }

    fn hits(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| SearchResult {
                title: format!("hit {}", i),
                url: format!("https://example.com/{}", i),
                content: format!("content {}", i),
            })
            .collect()
    }

    fn gateway_of(providers: &[Arc<FakeProvider>]) -> SearchGateway {
        SearchGateway::new(
            providers
                .iter()
                .map(|p| p.clone() as Arc<dyn SearchProvider>)
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_first_non_empty_provider_wins() {
        let p1 = Arc::new(FakeProvider::new("p1", Vec::new()));
        let p2 = Arc::new(FakeProvider::new("p2", hits(3)));
        let gateway = gateway_of(&[p1.clone(), p2.clone()]);

        let results = gateway.search("capital of France").await;
        assert_eq!(results, hits(3));
        assert_eq!(p1.call_count(), 1);
        assert_eq!(p2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_later_providers_not_tried_after_success() {
        let p1 = Arc::new(FakeProvider::new("p1", hits(2)));
        let p2 = Arc::new(FakeProvider::new("p2", hits(3)));
        let gateway = gateway_of(&[p1.clone(), p2.clone()]);

        let results = gateway.search("q").await;
        assert_eq!(results.len(), 2);
        assert_eq!(p2.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_providers_skipped() {
        let p1 = Arc::new(FakeProvider::disabled("p1"));
        let p2 = Arc::new(FakeProvider::new("p2", hits(1)));
        let gateway = gateway_of(&[p1.clone(), p2.clone()]);

        let results = gateway.search("q").await;
        assert_eq!(results.len(), 1);
        assert_eq!(p1.call_count(), 0);
    }

    #[tokio::test]
    async fn test_all_empty_yields_empty() {
        let p1 = Arc::new(FakeProvider::new("p1", Vec::new()));
        let gateway = gateway_of(&[p1]);
        assert!(gateway.search("q").await.is_empty());
    }
}

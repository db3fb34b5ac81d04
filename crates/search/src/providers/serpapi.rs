//! SerpAPI search adapter.
//!
//! Key-gated: the provider is disabled when no API key is configured and
//! reports an empty result list immediately.

use crate::provider::{is_rate_limited, SearchProvider};
use crate::types::SearchResult;
use duplodocs_core::backoff;
use duplodocs_core::config::{SearchConfig, SerpApiConfig};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// SerpAPI provider adapter.
pub struct SerpApiProvider {
    config: SerpApiConfig,
    max_retries: u32,
    timeout: Duration,
    backoff_cap: Duration,
    client: reqwest::Client,
}

impl SerpApiProvider {
    pub fn new(config: SerpApiConfig, search: &SearchConfig) -> Self {
        Self {
            config,
            max_retries: search.max_retries,
            timeout: Duration::from_secs(search.timeout_secs),
            backoff_cap: Duration::from_secs(search.backoff_cap_secs),
            client: reqwest::Client::new(),
        }
    }

    async fn search_once(&self, query: &str, api_key: &str) -> Result<Vec<SearchResult>, String> {
        let num = self.config.num.to_string();
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("api_key", api_key),
                ("engine", self.config.engine.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("gl", self.config.gl.as_str()),
                ("hl", self.config.hl.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("SerpAPI error: {}", status));
        }

        let data: SerpApiResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(normalize(data))
    }
}

fn normalize(data: SerpApiResponse) -> Vec<SearchResult> {
    data.organic_results
        .into_iter()
        .map(|result| SearchResult {
            title: result.title,
            url: result.link,
            content: result.snippet,
        })
        .collect()
}

#[async_trait::async_trait]
impl SearchProvider for SerpApiProvider {
    fn name(&self) -> &str {
        "serpapi"
    }

    fn enabled(&self) -> bool {
        self.config
            .api_key
            .as_ref()
            .is_some_and(|key| !key.is_empty())
    }

    async fn search(&self, query: &str) -> Vec<SearchResult> {
        let Some(api_key) = self.config.api_key.clone().filter(|k| !k.is_empty()) else {
            tracing::warn!("SerpAPI key not found");
            return Vec::new();
        };

        let attempts = self.max_retries.max(1);
        for attempt in 0..attempts {
            match self.search_once(query, &api_key).await {
                Ok(results) => return results,
                Err(e) => {
                    tracing::error!("Error in SerpAPI search: {}", e);
                    if is_rate_limited(&e) && attempt + 1 < attempts {
                        let wait = backoff::backoff_delay(attempt, self.backoff_cap);
                        tracing::warn!(
                            "Rate limit hit, waiting {:.2}s before retry...",
                            wait.as_secs_f64()
                        );
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Vec::new()
    }
}

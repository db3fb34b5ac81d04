//! DuckDuckGo search adapter.
//!
//! Keyless. Uses the instant-answer JSON endpoint with region and
//! safe-search parameters, normalizing the abstract plus related topics
//! into search results.

use crate::provider::{is_rate_limited, SearchProvider};
use crate::types::SearchResult;
use duplodocs_core::backoff;
use duplodocs_core::config::{DuckDuckGoConfig, SearchConfig};
use serde::Deserialize;
use std::time::Duration;

const ENDPOINT: &str = "https://api.duckduckgo.com/";

#[derive(Debug, Deserialize)]
struct DdgResponse {
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractText", default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<DdgTopic>,
}

#[derive(Debug, Deserialize)]
struct DdgTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
    // Category entries nest their topics one level down.
    #[serde(rename = "Topics", default)]
    topics: Vec<DdgTopic>,
}

/// DuckDuckGo provider adapter.
pub struct DuckDuckGoProvider {
    config: DuckDuckGoConfig,
    max_retries: u32,
    timeout: Duration,
    backoff_cap: Duration,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    pub fn new(config: DuckDuckGoConfig, search: &SearchConfig) -> Self {
        Self {
            config,
            max_retries: search.max_retries,
            timeout: Duration::from_secs(search.timeout_secs),
            backoff_cap: Duration::from_secs(search.backoff_cap_secs),
            client: reqwest::Client::new(),
        }
    }

    /// Map the configured safe-search level onto DuckDuckGo's `kp` value.
    fn safesearch_param(&self) -> &'static str {
        match self.config.safesearch.as_str() {
            "strict" => "1",
            "moderate" => "-1",
            _ => "-2",
        }
    }

    async fn search_once(&self, query: &str) -> Result<Vec<SearchResult>, String> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
                ("kl", self.config.region.as_str()),
                ("kp", self.safesearch_param()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("DuckDuckGo error: {}", status));
        }

        let data: DdgResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(normalize(data, self.config.max_results as usize))
    }
}

fn normalize(data: DdgResponse, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if !data.abstract_text.is_empty() {
        results.push(SearchResult {
            title: data.heading.clone(),
            url: data.abstract_url.clone(),
            content: data.abstract_text.clone(),
        });
    }

    let mut flat = Vec::new();
    flatten_topics(data.related_topics, &mut flat);
    for topic in flat {
        if results.len() >= max_results {
            break;
        }
        if topic.text.is_empty() {
            continue;
        }
        // Related topics carry "Title - description" style text.
        let title = topic
            .text
            .split(" - ")
            .next()
            .unwrap_or(topic.text.as_str())
            .to_string();
        results.push(SearchResult {
            title,
            url: topic.first_url,
            content: topic.text,
        });
    }

    results.truncate(max_results);
    results
}

fn flatten_topics(topics: Vec<DdgTopic>, out: &mut Vec<DdgTopic>) {
    for mut topic in topics {
        let nested = std::mem::take(&mut topic.topics);
        if !topic.text.is_empty() {
            out.push(topic);
        }
        flatten_topics(nested, out);
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Vec<SearchResult> {
        let attempts = self.max_retries.max(1);
        for attempt in 0..attempts {
            match self.search_once(query).await {
                Ok(results) => {
                    tracing::info!(
                        "DuckDuckGo returned {} results for query '{}'",
                        results.len(),
                        query
                    );
                    return results;
                }
                Err(e) => {
                    tracing::error!("Error in DuckDuckGo search: {}", e);
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

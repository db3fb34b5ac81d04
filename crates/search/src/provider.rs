//! Search provider trait.

use crate::types::SearchResult;

/// A single external search backend.
///
/// Adapters own their retry policy and never propagate errors: a provider
/// that keeps failing after its retry budget reports an empty result list,
/// and the gateway moves on to the next provider.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider identifier used in configuration and logs.
    fn name(&self) -> &str;

    /// Whether the provider is usable. Key-gated providers report `false`
    /// when their credential is absent.
    fn enabled(&self) -> bool {
        true
    }

    /// Run one search, retries included.
    async fn search(&self, query: &str) -> Vec<SearchResult>;
}

/// Classify an error message as a rate-limit/throttle rejection.
///
/// Rate-limited attempts back off before retrying; other failures retry
/// immediately within the same attempt budget.
pub fn is_rate_limited(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("too many requests") || lower.contains("429")
}

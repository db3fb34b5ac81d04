//! Per-process response cache.
//!
//! Keyed by normalized query text and shared by the documentation and
//! internet paths. Values are idempotent re-computations of the same key,
//! so concurrent population races are last-writer-wins and no lock is held
//! across a resolution. Unbounded and never invalidated by corpus updates.

use crate::response::QueryResponse;
use std::collections::HashMap;
use std::sync::Mutex;

/// Normalize a query into its cache key: lowercased and trimmed.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Shared response cache.
pub struct ResponseCache {
    enabled: bool,
    entries: Mutex<HashMap<String, QueryResponse>>,
}

impl ResponseCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached response by raw query text.
    pub fn get(&self, query: &str) -> Option<QueryResponse> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.lock().ok()?;
        entries.get(&normalize_query(query)).cloned()
    }

    /// Store a response under the normalized query key.
    pub fn insert(&self, query: &str, response: &QueryResponse) {
        if !self.enabled {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(normalize_query(query), response.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_folds_case_and_whitespace() {
        assert_eq!(normalize_query("  What is DuploCloud?  "), "what is duplocloud?");
    }

    #[test]
    fn test_get_after_insert_ignores_case() {
        let cache = ResponseCache::new(true);
        let response = QueryResponse::new("answer", Vec::new(), 0.8, false);

        cache.insert("What is DuploCloud?", &response);
        assert_eq!(cache.get("what is duplocloud?  "), Some(response));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = ResponseCache::new(false);
        let response = QueryResponse::new("answer", Vec::new(), 0.8, false);

        cache.insert("q", &response);
        assert!(cache.get("q").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = ResponseCache::new(true);
        let first = QueryResponse::new("first", Vec::new(), 0.8, false);
        let second = QueryResponse::new("second", Vec::new(), 0.9, false);

        cache.insert("q", &first);
        cache.insert("q", &second);
        assert_eq!(cache.get("q").unwrap().answer, "second");
        assert_eq!(cache.len(), 1);
    }
}

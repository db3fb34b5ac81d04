//! Normalized search result shape.

use serde::{Deserialize, Serialize};

/// A single web search hit, normalized from a provider's native shape.
///
/// Ephemeral: created per external query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

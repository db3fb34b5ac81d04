//! Externally visible response types.

use serde::{Deserialize, Serialize};

/// The evidence unit attached to a response, built from either a
/// documentation chunk or a web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub content: String,
    pub relevance_score: f32,
}

impl Source {
    pub fn new(
        title: impl Into<String>,
        url: Option<String>,
        content: impl Into<String>,
        relevance_score: f32,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.filter(|u| !u.is_empty()),
            content: content.into(),
            relevance_score: relevance_score.clamp(0.0, 1.0),
        }
    }
}

/// The sole externally observable result type. Every code path terminates
/// in one of these, even on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub confidence_score: f32,
    pub used_internet_search: bool,
}

impl QueryResponse {
    pub fn new(
        answer: impl Into<String>,
        sources: Vec<Source>,
        confidence_score: f32,
        used_internet_search: bool,
    ) -> Self {
        Self {
            answer: answer.into(),
            sources,
            confidence_score: confidence_score.clamp(0.0, 1.0),
            used_internet_search,
        }
    }

    /// Generic error response for contract violations caught at the top
    /// level.
    pub fn error() -> Self {
        Self::new(
            "An error occurred while processing your query.",
            Vec::new(),
            0.0,
            false,
        )
    }
}

//! Web search layer for the duplodocs assistant.
//!
//! External search backends are modeled as adapters behind a common
//! [`SearchProvider`] trait, each normalizing its native result shape into
//! [`SearchResult`] and owning its retry policy. The [`SearchGateway`]
//! walks providers in a configured priority order and returns the first
//! non-empty result list: best-effort, not best-of.

pub mod gateway;
pub mod provider;
pub mod providers;
pub mod types;

// Re-export main types
pub use gateway::SearchGateway;
pub use provider::SearchProvider;
pub use providers::{DuckDuckGoProvider, SerpApiProvider};
pub use types::SearchResult;

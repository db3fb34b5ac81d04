//! Embedding providers.
//!
//! Providers are synchronous: embedding happens inside the evidence store,
//! which always runs on the blocking worker pool rather than the async
//! scheduler.

pub mod ollama;
pub mod trigram;

use duplodocs_core::config::EmbeddingConfig;
use duplodocs_core::{AppError, AppResult};
use std::sync::Arc;

pub use ollama::OllamaEmbedder;
pub use trigram::TrigramEmbedder;

/// Trait for embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Embedding vector dimension
    fn dimensions(&self) -> usize;

    /// Generate a unit-normalized embedding for one text.
    fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Create an embedding provider based on configuration.
pub fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramEmbedder::new(config.dimensions))),
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            config.model.clone(),
            config.dimensions,
        ))),
        other => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}

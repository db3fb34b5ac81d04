//! Ollama embedding provider.
//!
//! Calls the local Ollama API (`/api/embeddings`) with a blocking client;
//! the store always runs off the async scheduler. Retries with exponential
//! backoff before giving up.

use crate::embeddings::EmbeddingProvider;
use duplodocs_core::{backoff, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider (e.g. `nomic-embed-text`).
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
    client: reqwest::blocking::Client,
}

impl OllamaEmbedder {
    pub fn new(model: String, dimensions: usize) -> Self {
        let base_url =
            std::env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            model,
            dimensions,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn embed_once(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .map_err(|e| AppError::Llm(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Embedding request returned status {}",
                response.status()
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| AppError::Llm(format!("Failed to parse embedding response: {}", e)))?;

        let mut embedding = parsed.embedding;
        if embedding.len() != self.dimensions {
            return Err(AppError::Llm(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                embedding.len(),
                self.dimensions
            )));
        }

        // Ollama vectors are not normalized; the store expects unit length.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        Ok(embedding)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.embed_once(text) {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    tracing::warn!(
                        "Embedding failed (attempt {}/{}): {}",
                        attempt + 1,
                        MAX_RETRIES,
                        e
                    );
                    last_error = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        std::thread::sleep(backoff::backoff_delay(
                            attempt,
                            Duration::from_secs(10),
                        ));
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Llm("Unknown embedding error".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_metadata() {
        let provider = OllamaEmbedder::new("nomic-embed-text".to_string(), 768);
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.dimensions(), 768);
    }
}

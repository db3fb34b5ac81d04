//! Cascading multi-model generation strategy.
//!
//! Walks a fixed model priority list. Each model gets one shot behind a
//! health probe; any failure (probe, transport, non-200, timeout, empty
//! text) advances to the next model. Exhaustion is an ordinary outcome, not
//! an error; the caller owns the terminal extraction fallback.

use crate::client::{ChatMessage, GenerationOptions, OllamaClient};
use duplodocs_core::config::ModelsConfig;
use std::sync::Arc;
use std::time::Duration;

/// Terminal states of one cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// A model produced non-empty text.
    Generated { model: String, text: String },
    /// Every model in the priority list failed.
    Exhausted,
}

/// Prioritized model list bound to a serving endpoint.
pub struct ModelCascade {
    client: Arc<OllamaClient>,
    models: ModelsConfig,
    health_timeout: Duration,
}

impl ModelCascade {
    pub fn new(client: Arc<OllamaClient>, models: ModelsConfig, health_timeout: Duration) -> Self {
        Self {
            client,
            models,
            health_timeout,
        }
    }

    pub fn priority(&self) -> &[String] {
        &self.models.priority
    }

    /// Run the cascade for one prompt.
    ///
    /// State machine: `TryModel(i) → Generated` on success,
    /// `TryModel(i) → TryModel(i+1)` on any failure, `TryModel(N) →
    /// Exhausted`. An "endpoint busy" rejection is just another failure
    /// here; the endpoint enforces its own per-model concurrency ceiling.
    pub async fn run(&self, prompt: &str, system: Option<&str>) -> CascadeOutcome {
        for model in &self.models.priority {
            tracing::info!("Attempting to use model: {}", model);

            if let Err(e) = self.client.health_check(self.health_timeout).await {
                tracing::warn!("Health check failed for {}: {}, trying next model", model, e);
                continue;
            }

            let profile = self.models.profile(model);
            let options = GenerationOptions::from(&profile);
            let timeout = Duration::from_secs(profile.timeout_secs);

            let mut messages = Vec::with_capacity(2);
            if let Some(system) = system {
                messages.push(ChatMessage::system(system));
            }
            messages.push(ChatMessage::user(prompt));

            match self.client.chat(model, &messages, &options, timeout).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!("Successfully generated response with {}", model);
                    return CascadeOutcome::Generated {
                        model: model.clone(),
                        text,
                    };
                }
                Ok(_) => {
                    tracing::warn!("Model {} returned an empty response, trying next", model);
                }
                Err(e) => {
                    tracing::warn!("Error with model {}: {}", model, e);
                }
            }
        }

        tracing::warn!("All models failed");
        CascadeOutcome::Exhausted
    }
}

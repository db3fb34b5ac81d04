//! Single-model retry strategy.
//!
//! Unlike the cascade, this policy stays on one model and spends its whole
//! retry budget there, sleeping with exponential backoff plus jitter
//! between attempts. Used for direct model calls where escalating to a
//! different model is not wanted.

use crate::client::{GenerationOptions, OllamaClient};
use duplodocs_core::backoff;
use std::time::Duration;

/// Ceiling on the backoff sleep between attempts.
const BACKOFF_CAP: Duration = Duration::from_secs(10);

/// Query one model with retries, returning an empty string only after every
/// attempt is exhausted.
pub async fn generate_with_retry(
    client: &OllamaClient,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
    timeout: Duration,
    max_retries: u32,
) -> String {
    let attempts = max_retries.max(1);

    for attempt in 0..attempts {
        match client.generate(model, prompt, options, timeout).await {
            Ok(text) if !text.trim().is_empty() => return text,
            Ok(_) => {
                tracing::warn!("Model {} returned an empty response", model);
            }
            Err(e) => {
                tracing::error!(
                    "Error in attempt {} for model {}: {}",
                    attempt + 1,
                    model,
                    e
                );
            }
        }

        if attempt + 1 < attempts {
            let wait = backoff::backoff_delay(attempt, BACKOFF_CAP);
            tracing::warn!(
                "Retrying Ollama query for model {} after {:.2}s",
                model,
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplodocs_core::config::ModelProfile;

    #[tokio::test]
    async fn test_retry_returns_empty_after_exhaustion() {
        let client = OllamaClient::new("http://127.0.0.1:9");
        let options = GenerationOptions::from(&ModelProfile::default());

        let text = generate_with_retry(
            &client,
            "phi",
            "What is a tenant?",
            &options,
            Duration::from_millis(200),
            1,
        )
        .await;

        assert!(text.is_empty());
    }
}

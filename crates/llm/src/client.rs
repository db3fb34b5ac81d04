//! Ollama HTTP transport.
//!
//! Thin request/response wrapper around the Ollama serving endpoint:
//! completion and chat calls, the availability probe, model listing, and
//! model pulling for bootstrap.

use duplodocs_core::config::ModelProfile;
use duplodocs_core::{backoff, AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A chat message in Ollama's wire format.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options sent with every completion/chat call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    pub num_predict: u32,
}

impl From<&ModelProfile> for GenerationOptions {
    fn from(profile: &ModelProfile) -> Self {
        Self {
            temperature: profile.temperature,
            top_p: profile.top_p,
            top_k: profile.top_k,
            repeat_penalty: profile.repeat_penalty,
            num_predict: profile.num_predict,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
}

/// Client for the Ollama serving endpoint.
pub struct OllamaClient {
    /// Base URL for the Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Quick availability probe of the serving endpoint.
    ///
    /// Succeeds iff GET `/api/tags` answers 200 within `timeout`.
    pub async fn health_check(&self, timeout: Duration) -> AppResult<()> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Ollama server unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Ollama server returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// List the model tags installed on the serving endpoint.
    pub async fn list_models(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to list models: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Ollama server returned status {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse model list: {}", e)))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Select the best available model from a priority list.
    ///
    /// Returns the first priority entry that is installed on the endpoint;
    /// if the listing fails or nothing matches, falls back to the first
    /// priority entry so bootstrap can attempt a pull.
    pub async fn select_model(&self, priority: &[String]) -> String {
        match self.list_models().await {
            Ok(available) => {
                for model in priority {
                    if available.contains(model) {
                        tracing::info!("Selected model: {}", model);
                        return model.clone();
                    }
                }
            }
            Err(e) => {
                tracing::error!("Error selecting model: {}", e);
            }
        }
        priority.first().cloned().unwrap_or_default()
    }

    /// Check whether a specific model is installed.
    pub async fn is_model_available(&self, model: &str) -> bool {
        match self.list_models().await {
            Ok(models) => models.iter().any(|m| m == model),
            Err(e) => {
                tracing::error!("Error checking model availability: {}", e);
                false
            }
        }
    }

    /// Pull a model onto the serving endpoint, retrying with exponential
    /// backoff and falling through the priority list when the preferred
    /// model cannot be pulled.
    ///
    /// Returns the name of the model that was pulled.
    pub async fn pull_model(
        &self,
        model: &str,
        priority: &[String],
        timeout: Duration,
        retries: u32,
    ) -> AppResult<String> {
        for attempt in 0..retries.max(1) {
            tracing::info!(
                "Pulling model {} (attempt {}/{})",
                model,
                attempt + 1,
                retries.max(1)
            );

            match self.pull_once(model, timeout).await {
                Ok(()) => {
                    tracing::info!("Successfully pulled model {}", model);
                    return Ok(model.to_string());
                }
                Err(e) => {
                    tracing::error!("Error pulling model (attempt {}): {}", attempt + 1, e);
                }
            }

            // Try the alternatives before sleeping and retrying the original.
            for alternative in priority.iter().filter(|m| m.as_str() != model) {
                tracing::info!("Trying to pull alternative model: {}", alternative);
                if self.pull_once(alternative, timeout).await.is_ok() {
                    tracing::info!("Successfully pulled alternative model {}", alternative);
                    return Ok(alternative.clone());
                }
            }

            if attempt + 1 < retries.max(1) {
                tokio::time::sleep(backoff::backoff_delay(attempt, Duration::from_secs(10))).await;
            }
        }

        Err(AppError::Llm("Failed to pull any model".to_string()))
    }

    async fn pull_once(&self, model: &str, timeout: Duration) -> AppResult<()> {
        let url = format!("{}/api/pull", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PullRequest { name: model })
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to pull model {}: {}", model, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Llm(format!(
                "Pull of {} returned status {}",
                model,
                response.status()
            )));
        }
        Ok(())
    }

    /// Chat call against `/api/chat`.
    ///
    /// Returns the assistant message content on HTTP success.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &GenerationOptions,
        timeout: Duration,
    ) -> AppResult<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model,
            messages,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Chat request to {} failed: {}", model, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Model {} returned status {}: {}",
                model, status, error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat response: {}", e)))?;

        Ok(chat.message.content)
    }

    /// Completion call against `/api/generate`.
    ///
    /// Returns the generated text on HTTP success.
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
        timeout: Duration,
    ) -> AppResult<String> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };

        tracing::debug!("Sending prompt to Ollama model '{}'", model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Generate request to {} failed: {}", model, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Model {} returned status {}: {}",
                model, status, error_text
            )));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse generate response: {}", e)))?;

        Ok(generated.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_profile() {
        let mut profile = ModelProfile::default();
        profile.temperature = 0.1;
        profile.top_p = 0.5;
        profile.top_k = 10;
        profile.num_predict = 50;

        let options = GenerationOptions::from(&profile);
        assert_eq!(options.temperature, 0.1);
        assert_eq!(options.top_p, 0.5);
        assert_eq!(options.top_k, 10);
        assert_eq!(options.repeat_penalty, 1.1);
        assert_eq!(options.num_predict, 50);
    }

    #[test]
    fn test_chat_message_roles() {
        let system = ChatMessage::system("rules");
        let user = ChatMessage::user("question");
        assert_eq!(system.role, "system");
        assert_eq!(user.role, "user");
        assert_eq!(user.content, "question");
    }

    #[tokio::test]
    async fn test_health_check_unreachable_endpoint() {
        let client = OllamaClient::new("http://127.0.0.1:9");
        let result = client.health_check(Duration::from_millis(500)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_select_model_falls_back_to_first_priority() {
        let client = OllamaClient::new("http://127.0.0.1:9");
        let priority = vec!["phi".to_string(), "mistral".to_string()];
        let selected = client.select_model(&priority).await;
        assert_eq!(selected, "phi");
    }
}

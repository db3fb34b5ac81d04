//! Generation engine: model cascade plus extraction terminal.
//!
//! Wraps the model cascade so that exhaustion terminates in the
//! zero-model `direct_response` extractor over the original query and
//! evidence context. `generate` therefore never fails and never produces
//! an empty answer.

use crate::extract;
use duplodocs_llm::{CascadeOutcome, ModelCascade};

/// Terminal states of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedAnswer {
    /// A model in the priority list produced the text.
    Model { model: String, text: String },
    /// Every model failed; the text came from direct extraction.
    Extracted(String),
}

impl GeneratedAnswer {
    pub fn into_text(self) -> String {
        match self {
            Self::Model { text, .. } => text,
            Self::Extracted(text) => text,
        }
    }
}

/// Cascade-backed generation with a non-generative terminal fallback.
pub struct GenerationEngine {
    cascade: ModelCascade,
}

impl GenerationEngine {
    pub fn new(cascade: ModelCascade) -> Self {
        Self { cascade }
    }

    /// Generate an answer for `prompt`, falling back to extraction over
    /// `query`/`context` when the cascade is exhausted.
    pub async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        query: &str,
        context: &str,
    ) -> GeneratedAnswer {
        match self.cascade.run(prompt, system).await {
            CascadeOutcome::Generated { model, text } => GeneratedAnswer::Model { model, text },
            CascadeOutcome::Exhausted => {
                tracing::warn!("All models failed, using direct response");
                GeneratedAnswer::Extracted(extract::direct_response(query, context))
            }
        }
    }
}

//! Prompt templates for the duplodocs assistant.
//!
//! Two fixed templates rendered with Handlebars:
//! - the documentation answer prompt, which wraps retrieved evidence and the
//!   user question;
//! - the structured extraction system prompt, which constrains the model to
//!   the provided sources.

use duplodocs_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde_json::json;

/// Template for answering from retrieved context.
const DOCUMENTATION_TEMPLATE: &str = "\
Based on this documentation, answer the question directly and concisely:

{{context}}

Question: {{query}}

Make sure you cite sources or provide urls or links to the information retrieved.

Answer:";

/// System prompt used on the internet path to keep the model grounded in
/// the search snippets.
pub const STRUCTURED_SYSTEM_PROMPT: &str = "\
You are a helpful assistant that provides direct, factual answers.
Your task is to answer the question using ONLY the information provided.
Do not add any explanations, instructions, or information not present in the sources.
If the information is not available in the sources, say so explicitly.";

/// Renders the fixed prompt templates.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Register the templates. Fails only on a malformed template, which is
    /// a build-time defect, so construction happens once at startup.
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string("documentation", DOCUMENTATION_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;
        Ok(Self { registry })
    }

    /// Render the documentation answer prompt.
    pub fn documentation_prompt(&self, context: &str, query: &str) -> AppResult<String> {
        self.registry
            .render("documentation", &json!({ "context": context, "query": query }))
            .map_err(|e| AppError::Prompt(format!("Failed to render prompt: {}", e)))
    }
}

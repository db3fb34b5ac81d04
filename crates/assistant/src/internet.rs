//! Internet path: cache → provider gateway → extract-then-generate.
//!
//! Extraction runs *before* generation here, the opposite order from the
//! documentation path. Web snippets are noisier but often already contain
//! a literal answer.

use crate::extract;
use crate::resolver::Assistant;
use crate::response::{QueryResponse, Source};
use duplodocs_core::AppResult;
use duplodocs_prompt::STRUCTURED_SYSTEM_PROMPT;

impl Assistant {
    pub(crate) async fn answer_from_internet(&self, query: &str) -> AppResult<QueryResponse> {
        if let Some(cached) = self.cache.get(query) {
            tracing::info!("Using cached results");
            return Ok(cached);
        }

        let results = self.gateway.search(query).await;
        if results.is_empty() {
            return Ok(QueryResponse::new(
                "I couldn't find any relevant information.",
                Vec::new(),
                0.0,
                true,
            ));
        }

        tracing::info!("Found {} results", results.len());
        let sources: Vec<Source> = results
            .into_iter()
            .map(|result| Source::new(result.title, Some(result.url), result.content, 1.0))
            .collect();

        // Step 1: try to extract a direct answer from the snippets.
        if let Some(direct) = extract::extract_answer(query, &sources) {
            tracing::info!("Found direct answer from sources");
            let response = QueryResponse::new(direct, sources, 0.9, true);
            self.cache.insert(query, &response);
            return Ok(response);
        }

        // Step 2: generate under the structured system prompt.
        tracing::info!("No direct answer found, trying with structured prompt");
        let context = sources
            .iter()
            .map(|s| format!("Title: {}\nContent: {}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = match self.prompts.documentation_prompt(&context, query) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!("Prompt rendering failed: {}", e);
                return Ok(QueryResponse::new(
                    "I'm having trouble searching the internet right now. \
                     Please try again in a few moments.",
                    Vec::new(),
                    0.0,
                    true,
                ));
            }
        };

        let mut answer = self
            .engine
            .generate(&prompt, Some(STRUCTURED_SYSTEM_PROMPT), query, &context)
            .await
            .into_text();

        // Step 3: discard output that echoed the instructions.
        if extract::leaks_instructions(&answer) {
            tracing::info!("Model returned instructions, using fallback strategy");
            answer = extract::fallback_answer(query, &sources)
                .or_else(|| extract::first_sentence(&sources))
                .unwrap_or_else(|| "I couldn't find any relevant information.".to_string());
        }

        let response = QueryResponse::new(answer, sources, 0.8, true);
        self.cache.insert(query, &response);

        tracing::info!("Response generated successfully");
        Ok(response)
    }
}

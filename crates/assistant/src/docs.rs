//! Documentation path: cache → exact-substring fast path → vector top-1 →
//! generate-or-extract.

use crate::cache::normalize_query;
use crate::extract;
use crate::resolver::Assistant;
use crate::response::{QueryResponse, Source};
use duplodocs_core::{AppError, AppResult};
use duplodocs_knowledge::Document;

impl Assistant {
    pub(crate) async fn answer_from_documentation(&self, query: &str) -> AppResult<QueryResponse> {
        if let Some(cached) = self.cache.get(query) {
            tracing::info!("Using cached results");
            return Ok(cached);
        }

        let doc = match self.find_relevant_doc(query).await? {
            Some(doc) => doc,
            None => {
                tracing::warn!("No relevant documentation found");
                return Ok(QueryResponse::new(
                    "I couldn't find any relevant documentation for your query.",
                    Vec::new(),
                    0.0,
                    false,
                ));
            }
        };

        tracing::info!(
            "Retrieved document '{}' ({} characters)",
            doc.title,
            doc.content.len()
        );

        // The whole document is the evidence unit on this path.
        let sources = vec![Source::new(doc.title.clone(), None, doc.content.clone(), 1.0)];
        let context = format!("Title: {}\nContent: {}", doc.title, doc.content);

        let prompt = match self.prompts.documentation_prompt(&context, query) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!("Prompt rendering failed: {}", e);
                return Ok(QueryResponse::new(
                    "I'm having trouble processing your query. \
                     Please try again with a more specific question.",
                    sources,
                    0.0,
                    false,
                ));
            }
        };

        let generation = tokio::time::timeout(
            self.generation_timeout(),
            self.engine.generate(&prompt, None, query, &context),
        )
        .await;

        let response = match generation {
            Ok(answer) => {
                tracing::info!("Response generated successfully");
                QueryResponse::new(answer.into_text(), sources, 0.8, false)
            }
            Err(_) => {
                tracing::error!("Documentation query processing timed out");
                let direct = extract::direct_response(query, &context);
                QueryResponse::new(direct, sources, 0.5, false)
            }
        };

        self.cache.insert(query, &response);
        Ok(response)
    }

    /// Find the single most relevant document for a query.
    ///
    /// A lowercased exact-substring scan over full document contents runs
    /// first as a fast path for trivial lookups; only then does the vector
    /// index get queried, under the retrieval time budget.
    async fn find_relevant_doc(&self, query: &str) -> AppResult<Option<Document>> {
        if self.documentation.is_empty() {
            tracing::warn!("No documentation available for search");
            return Ok(None);
        }

        let query_lower = normalize_query(query);
        for doc in &self.documentation {
            if doc.content.to_lowercase().contains(&query_lower) {
                tracing::info!("Found exact match in document: {}", doc.title);
                return Ok(Some(doc.clone()));
            }
        }

        let store = self.store.clone();
        let text = query.to_string();
        let searched = tokio::time::timeout(
            self.retrieval_timeout(),
            self.pool.run(move || store.query(&text, 1)),
        )
        .await
        .map_err(|_| AppError::Knowledge("Documentation search timed out".to_string()))?;
        let matches = searched??;

        let Some(nearest) = matches.first() else {
            return Ok(None);
        };

        if nearest.distance >= self.config.vector_db.similarity_threshold {
            tracing::debug!(
                "Best match '{}' rejected (distance {:.3})",
                nearest.metadata.title,
                nearest.distance
            );
            return Ok(None);
        }

        tracing::debug!(
            "Relevant doc: {} (distance: {:.3})",
            nearest.metadata.title,
            nearest.distance
        );
        Ok(self
            .documentation
            .iter()
            .find(|doc| doc.title == nearest.metadata.title)
            .cloned())
    }
}

//! The query resolver.
//!
//! [`Assistant`] is the context object constructed once at startup: it owns
//! the corpus, evidence store, classifier, generation engine, search
//! gateway, cache, and worker pool, and is passed by reference into the
//! serving layer. Construction may fail (index/model bootstrap); resolution
//! never does.

use crate::cache::ResponseCache;
use crate::engine::GenerationEngine;
use crate::response::QueryResponse;
use crate::worker::WorkerPool;
use duplodocs_core::{AppConfig, AppError, AppResult};
use duplodocs_knowledge::{bootstrap_store, load_corpus, Document, DomainClassifier, EvidenceStore};
use duplodocs_llm::{ModelCascade, OllamaClient};
use duplodocs_prompt::PromptBuilder;
use duplodocs_search::SearchGateway;
use std::sync::Arc;
use std::time::Duration;

/// The assembled query-resolution pipeline.
pub struct Assistant {
    pub(crate) config: AppConfig,
    pub(crate) documentation: Vec<Document>,
    pub(crate) store: Arc<EvidenceStore>,
    pub(crate) classifier: Arc<DomainClassifier>,
    pub(crate) engine: GenerationEngine,
    pub(crate) gateway: SearchGateway,
    pub(crate) cache: ResponseCache,
    pub(crate) prompts: PromptBuilder,
    pub(crate) pool: WorkerPool,
}

impl Assistant {
    /// Build the assistant with the configured search providers.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let gateway = SearchGateway::from_config(&config.search);
        Self::with_gateway(config, gateway).await
    }

    /// Build the assistant with an explicit search gateway.
    ///
    /// Loads the corpus, opens the evidence store (embedding it on first
    /// load), and performs a best-effort model bootstrap against the
    /// serving endpoint.
    pub async fn with_gateway(config: AppConfig, gateway: SearchGateway) -> AppResult<Self> {
        tracing::info!("Initializing assistant components");
        config.validate()?;

        let documentation = load_corpus(&config.docs_dir)?;

        let vector_config = config.vector_db.clone();
        let corpus = documentation.clone();
        let store = tokio::task::spawn_blocking(move || bootstrap_store(&vector_config, &corpus))
            .await
            .map_err(|e| AppError::Knowledge(format!("Store bootstrap task failed: {}", e)))??;

        let classifier = Arc::new(DomainClassifier::new(
            store.clone(),
            config.vector_db.domain_similarity_threshold,
            config.domain_keywords.clone(),
        ));

        let client = Arc::new(OllamaClient::new(config.ollama.base_url.clone()));
        bootstrap_models(&client, &config).await;

        let cascade = ModelCascade::new(
            client,
            config.models.clone(),
            Duration::from_secs(config.ollama.health_timeout_secs),
        );

        let assistant = Self {
            documentation,
            store,
            classifier,
            engine: GenerationEngine::new(cascade),
            gateway,
            cache: ResponseCache::new(config.resolver.cache_enabled),
            prompts: PromptBuilder::new()?,
            pool: WorkerPool::new(config.resolver.worker_threads),
            config,
        };

        tracing::info!(
            "Assistant initialization complete ({} documents, {} chunks)",
            assistant.documentation.len(),
            assistant.store.count().unwrap_or(0)
        );
        Ok(assistant)
    }

    /// Resolve a query into a response. Never fails: any escaped error is
    /// converted into the generic error response.
    pub async fn resolve(&self, query: &str) -> QueryResponse {
        tracing::info!("Processing query: {}", query);

        match self.try_resolve(query).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error processing query: {}", e);
                QueryResponse::error()
            }
        }
    }

    async fn try_resolve(&self, query: &str) -> AppResult<QueryResponse> {
        let classifier = self.classifier.clone();
        let text = query.to_string();
        let classification = tokio::time::timeout(
            self.retrieval_timeout(),
            self.pool.run(move || classifier.classify(&text)),
        )
        .await;

        let in_domain = match classification {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("Domain classification timed out, using keyword fallback");
                self.classifier.keyword_match(query)
            }
        };

        if in_domain {
            tracing::info!("Query appears to be domain related, using documentation");
            self.answer_from_documentation(query).await
        } else {
            tracing::info!("Query appears to be general knowledge, using internet search");
            self.answer_from_internet(query).await
        }
    }

    /// Loaded corpus documents.
    pub fn documentation(&self) -> &[Document] {
        &self.documentation
    }

    /// Number of chunks currently in the evidence collection.
    pub async fn chunk_count(&self) -> AppResult<u32> {
        let store = self.store.clone();
        self.pool.run(move || store.count()).await?
    }

    /// Explicit corpus re-sync: reset the collection and re-embed every
    /// chunk of the loaded corpus. Returns the new chunk count.
    ///
    /// Responses already cached by running processes are not invalidated.
    pub async fn resync(&self) -> AppResult<u32> {
        let store = self.store.clone();
        let documents = self.documentation.clone();

        self.pool
            .run(move || -> AppResult<u32> {
                store.reset()?;
                for doc in &documents {
                    store.upsert(&doc.chunks())?;
                    tracing::info!("Stored embeddings for document: {}", doc.title);
                }
                store.count()
            })
            .await?
    }

    pub(crate) fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.config.resolver.retrieval_timeout_secs)
    }

    pub(crate) fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.resolver.generation_timeout_secs)
    }
}

/// Best-effort model bootstrap: select the best installed model from the
/// priority list and pull it if absent. A down endpoint only logs: the
/// cascade health-probes again on every query, so startup proceeds.
async fn bootstrap_models(client: &OllamaClient, config: &AppConfig) {
    let health_timeout = Duration::from_secs(config.ollama.health_timeout_secs);
    if let Err(e) = client.health_check(health_timeout).await {
        tracing::warn!("Ollama server is not reachable at startup: {}", e);
        return;
    }

    let model = client.select_model(&config.models.priority).await;
    if model.is_empty() {
        return;
    }

    if !client.is_model_available(&model).await {
        tracing::info!("Model {} not found, pulling it...", model);
        let result = client
            .pull_model(
                &model,
                &config.models.priority,
                Duration::from_secs(config.ollama.pull_timeout_secs),
                config.ollama.pull_retries,
            )
            .await;
        if let Err(e) = result {
            tracing::warn!("Model pull failed: {}", e);
        }
    }
}

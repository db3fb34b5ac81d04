//! Configuration management for the duplodocs assistant.
//!
//! Configuration is loaded once at process start and merged from three
//! layers, later layers winning:
//! - built-in defaults (the tuned values below)
//! - an optional YAML config file
//! - environment variables (`SERPAPI_API_KEY`, `OLLAMA_URL`, `RUST_LOG`,
//!   `NO_COLOR`)
//!
//! Every tuned constant in the pipeline (similarity thresholds, model
//! priority and parameter profiles, search provider settings, timeouts and
//! retry ceilings) lives here rather than being hard-coded at the use site.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the documentation corpus (`.md` / `.txt` files)
    pub docs_dir: PathBuf,

    /// Optional config file path
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Vector index settings
    pub vector_db: VectorDbConfig,

    /// Ollama serving endpoint settings
    pub ollama: OllamaConfig,

    /// Generation model priority and per-model profiles
    pub models: ModelsConfig,

    /// Search provider settings
    pub search: SearchConfig,

    /// Resolver time budgets and cache settings
    pub resolver: ResolverConfig,

    /// HTTP API settings
    pub server: ServerConfig,

    /// Keyword fallback set for the domain classifier
    pub domain_keywords: Vec<String>,
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Directory the index lives in (created lazily)
    pub path: PathBuf,

    /// Collection name (one collection per index)
    pub collection: String,

    /// Generic retrieval threshold: a chunk is relevant iff its cosine
    /// distance to the query is below this value
    pub similarity_threshold: f32,

    /// Domain classification threshold. Tighter than the retrieval
    /// threshold: misrouting a general query into the documentation path
    /// is cheaper than the reverse.
    pub domain_similarity_threshold: f32,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vector_db"),
            collection: "documentation".to_string(),
            similarity_threshold: 0.45,
            domain_similarity_threshold: 0.35,
            embedding: EmbeddingConfig::default(),
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" (deterministic, offline) or "ollama"
    pub provider: String,

    /// Model identifier (ollama provider only)
    pub model: String,

    /// Embedding vector dimension
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 384,
        }
    }
}

/// Ollama serving endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API
    pub base_url: String,

    /// Timeout for the availability probe (GET /api/tags)
    pub health_timeout_secs: u64,

    /// Timeout for a single model pull request
    pub pull_timeout_secs: u64,

    /// Attempts for pulling a model at bootstrap
    pub pull_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            health_timeout_secs: 2,
            pull_timeout_secs: 30,
            pull_retries: 3,
        }
    }
}

/// Static per-model generation parameters.
///
/// Selected, never mutated, at generation time. The `name` field is filled
/// from the profile map key after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelProfile {
    #[serde(skip)]
    pub name: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
    /// Per-call timeout for this model
    pub timeout_secs: u64,
    /// Response length ceiling
    pub num_predict: u32,
    /// Retry ceiling for the single-model retry strategy
    pub max_retries: u32,
    /// In-flight request ceiling enforced by the serving endpoint
    pub concurrency_limit: u32,
}

impl Default for ModelProfile {
    fn default() -> Self {
        // neural-chat tuning doubles as the catch-all profile
        Self {
            name: String::new(),
            temperature: 0.2,
            top_p: 0.6,
            top_k: 15,
            repeat_penalty: 1.1,
            timeout_secs: 10,
            num_predict: 150,
            max_retries: 1,
            concurrency_limit: 1,
        }
    }
}

/// Model priority list and profile table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Models tried strictly in this order
    pub priority: Vec<String>,

    /// Per-model parameter profiles keyed by model name
    pub profiles: HashMap<String, ModelProfile>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        let mut profiles = HashMap::new();

        profiles.insert(
            "phi".to_string(),
            ModelProfile {
                name: "phi".to_string(),
                temperature: 0.1,
                top_p: 0.5,
                top_k: 10,
                repeat_penalty: 1.1,
                timeout_secs: 5,
                num_predict: 50,
                max_retries: 1,
                concurrency_limit: 3,
            },
        );
        profiles.insert(
            "mistral".to_string(),
            ModelProfile {
                name: "mistral".to_string(),
                temperature: 0.3,
                top_p: 0.6,
                top_k: 20,
                repeat_penalty: 1.1,
                timeout_secs: 8,
                num_predict: 100,
                max_retries: 1,
                concurrency_limit: 2,
            },
        );
        profiles.insert(
            "neural-chat".to_string(),
            ModelProfile {
                name: "neural-chat".to_string(),
                ..ModelProfile::default()
            },
        );

        Self {
            // Fastest model first
            priority: vec![
                "phi".to_string(),
                "mistral".to_string(),
                "neural-chat".to_string(),
            ],
            profiles,
        }
    }
}

impl ModelsConfig {
    /// Resolve the profile for a model, falling back to the default tuning
    /// for models without an explicit entry.
    pub fn profile(&self, model: &str) -> ModelProfile {
        self.profiles.get(model).cloned().unwrap_or_else(|| {
            let mut profile = ModelProfile::default();
            profile.name = model.to_string();
            profile
        })
    }
}

/// Search provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Providers tried strictly in this order
    pub priority: Vec<String>,

    /// Retry ceiling per provider
    pub max_retries: u32,

    /// Per-request timeout
    pub timeout_secs: u64,

    /// Ceiling on the exponential backoff sleep
    pub backoff_cap_secs: u64,

    pub serpapi: SerpApiConfig,
    pub duckduckgo: DuckDuckGoConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            priority: vec!["serpapi".to_string(), "duckduckgo".to_string()],
            max_retries: 3,
            timeout_secs: 10,
            backoff_cap_secs: 10,
            serpapi: SerpApiConfig::default(),
            duckduckgo: DuckDuckGoConfig::default(),
        }
    }
}

/// SerpAPI provider configuration. Key-gated: the provider is disabled
/// when no API key is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiConfig {
    /// API key, resolved from `SERPAPI_API_KEY` at load time
    pub api_key: Option<String>,
    pub base_url: String,
    pub engine: String,
    pub num: u32,
    /// Google country code
    pub gl: String,
    /// Language code
    pub hl: String,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://serpapi.com/search".to_string(),
            engine: "google".to_string(),
            num: 3,
            gl: "us".to_string(),
            hl: "en".to_string(),
        }
    }
}

/// DuckDuckGo provider configuration. Keyless.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckDuckGoConfig {
    pub region: String,
    pub safesearch: String,
    pub max_results: u32,
}

impl Default for DuckDuckGoConfig {
    fn default() -> Self {
        Self {
            region: "wt-wt".to_string(),
            safesearch: "off".to_string(),
            max_results: 3,
        }
    }
}

/// Resolver time budgets and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Budget for evidence retrieval in the documentation path
    pub retrieval_timeout_secs: u64,

    /// Budget for answer generation in the documentation path
    pub generation_timeout_secs: u64,

    /// Permits in the blocking worker pool
    pub worker_threads: usize,

    /// Enable the shared response cache
    pub cache_enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            retrieval_timeout_secs: 20,
            generation_timeout_secs: 20,
            worker_threads: 2,
            cache_enabled: true,
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

fn default_domain_keywords() -> Vec<String> {
    [
        "duplo",
        "duplocloud",
        "infrastructure",
        "deployment",
        "cloud",
        "application focused",
        "application interface",
        "vpc",
        "vnet",
        "kubernetes",
        "k8s",
        "ecs",
        "tenant",
        "plan",
        "diagnostics",
        "app service",
        "cloud service",
        "devsecops",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            vector_db: VectorDbConfig::default(),
            ollama: OllamaConfig::default(),
            models: ModelsConfig::default(),
            search: SearchConfig::default(),
            resolver: ResolverConfig::default(),
            server: ServerConfig::default(),
            domain_keywords: default_domain_keywords(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional YAML file, and
    /// environment variables.
    ///
    /// Environment variables:
    /// - `DUPLODOCS_CONFIG`: path to config file
    /// - `DUPLODOCS_DOCS_DIR`: override docs directory
    /// - `SERPAPI_API_KEY`: SerpAPI credential
    /// - `OLLAMA_URL`: Ollama endpoint
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("DUPLODOCS_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if let Some(path) = config.config_file.clone() {
            config = config.merge_yaml(&path)?;
        } else {
            let default_path = PathBuf::from("duplodocs.yaml");
            if default_path.exists() {
                config = config.merge_yaml(&default_path)?;
            }
        }

        config.apply_env();
        config.finalize();
        Ok(config)
    }

    /// Load configuration from an explicit YAML file (CLI `--config`),
    /// still applying environment overrides on top.
    pub fn load_from(path: &PathBuf) -> AppResult<Self> {
        let mut config = Self::default().merge_yaml(path)?;
        config.apply_env();
        config.finalize();
        Ok(config)
    }

    /// Apply environment-variable overrides on top of file settings.
    pub fn apply_env(&mut self) {
        if let Ok(docs_dir) = std::env::var("DUPLODOCS_DOCS_DIR") {
            self.docs_dir = PathBuf::from(docs_dir);
        }

        if let Ok(key) = std::env::var("SERPAPI_API_KEY") {
            if !key.is_empty() {
                self.search.serpapi.api_key = Some(key);
            }
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.ollama.base_url = url;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            if self.log_level.is_none() {
                self.log_level = Some(level);
            }
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut result: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        result.config_file = Some(path.clone());
        result.verbose = self.verbose;
        Ok(result)
    }

    /// Apply CLI overrides, giving them precedence over the file and
    /// environment layers.
    pub fn with_overrides(
        mut self,
        docs_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(docs_dir) = docs_dir {
            self.docs_dir = docs_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Fill derived fields after the merge layers are applied.
    pub fn finalize(&mut self) {
        for (name, profile) in self.models.profiles.iter_mut() {
            profile.name = name.clone();
        }
    }

    /// Validate invariants that would otherwise only surface mid-query.
    pub fn validate(&self) -> AppResult<()> {
        if self.models.priority.is_empty() {
            return Err(AppError::Config(
                "Model priority list must not be empty".to_string(),
            ));
        }

        for threshold in [
            self.vector_db.similarity_threshold,
            self.vector_db.domain_similarity_threshold,
        ] {
            if !(0.0..=2.0).contains(&threshold) {
                return Err(AppError::Config(format!(
                    "Similarity threshold {} outside the valid cosine distance range",
                    threshold
                )));
            }
        }

        let known = ["serpapi", "duckduckgo"];
        for provider in &self.search.priority {
            if !known.contains(&provider.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown search provider: {}. Supported: {}",
                    provider,
                    known.join(", ")
                )));
            }
        }

        if self.vector_db.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimension must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.vector_db.similarity_threshold, 0.45);
        assert_eq!(config.vector_db.domain_similarity_threshold, 0.35);
        assert_eq!(config.search.priority, vec!["serpapi", "duckduckgo"]);
        assert_eq!(config.models.priority[0], "phi");
        assert!(config.domain_keywords.contains(&"duplocloud".to_string()));
    }

    #[test]
    fn test_profile_lookup_known_model() {
        let models = ModelsConfig::default();
        let phi = models.profile("phi");
        assert_eq!(phi.temperature, 0.1);
        assert_eq!(phi.timeout_secs, 5);
        assert_eq!(phi.num_predict, 50);
        assert_eq!(phi.concurrency_limit, 3);
    }

    #[test]
    fn test_profile_lookup_unknown_model_uses_default_tuning() {
        let models = ModelsConfig::default();
        let other = models.profile("llama3");
        assert_eq!(other.name, "llama3");
        assert_eq!(other.temperature, 0.2);
        assert_eq!(other.timeout_secs, 10);
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/tmp/docs")),
            None,
            None,
            true,
            false,
        );

        assert_eq!(config.docs_dir, PathBuf::from("/tmp/docs"));
        assert!(config.verbose);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_rejects_empty_priority() {
        let mut config = AppConfig::default();
        config.models.priority.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.search.priority = vec!["bing".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_section_keeps_field_defaults() {
        let yaml = r#"
vector_db:
  similarity_threshold: 0.5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.vector_db.similarity_threshold, 0.5);
        assert_eq!(config.vector_db.domain_similarity_threshold, 0.35);
        assert_eq!(config.vector_db.collection, "documentation");
    }

    #[test]
    fn test_finalize_fills_profile_names() {
        let yaml = r#"
models:
  priority: ["phi"]
  profiles:
    phi:
      temperature: 0.15
"#;
        let mut config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        config.finalize();
        assert_eq!(config.models.profiles["phi"].name, "phi");
        assert_eq!(config.models.profiles["phi"].temperature, 0.15);
    }
}

//! Error types for the duplodocs assistant.
//!
//! This module defines a unified error enum covering all error categories
//! in the application: configuration, I/O, generation, search, knowledge,
//! and prompt errors.

use thiserror::Error;

/// Unified error type for the duplodocs assistant.
///
/// Library functions return `Result<T, AppError>`. Per-query failures are
/// degraded into low-confidence responses by the resolver; `AppError` may
/// only propagate to the caller during process bootstrap.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation service errors (Ollama transport, model failures)
    #[error("Generation error: {0}")]
    Llm(String),

    /// Search provider errors
    #[error("Search error: {0}")]
    Search(String),

    /// Evidence store and corpus errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

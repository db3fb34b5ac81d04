//! Generation layer for the duplodocs assistant.
//!
//! Drives a local Ollama serving endpoint with two distinct failure
//! policies:
//!
//! - [`ModelCascade`] walks a fixed model priority list, health-probing and
//!   trying each model once, and reports exhaustion to the caller instead of
//!   erroring. Used by the prompt-driven documentation and internet paths.
//! - [`generate_with_retry`] stays on a single model and retries with
//!   exponential backoff plus jitter, returning an empty string only after
//!   every attempt is spent. Used for direct model calls.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

pub mod cascade;
pub mod client;
pub mod retry;

// Re-export main types
pub use cascade::{CascadeOutcome, ModelCascade};
pub use client::{ChatMessage, GenerationOptions, OllamaClient};
pub use retry::generate_with_retry;

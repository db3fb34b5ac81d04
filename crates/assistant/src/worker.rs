//! Bounded worker pool for blocking sub-operations.
//!
//! Vector search and store maintenance use a blocking SQLite client; they
//! are dispatched here so a slow retrieval cannot starve the async
//! scheduler. Callers apply their own `tokio::time::timeout`; a timed-out
//! task keeps running to completion in the blocking pool (holding its
//! permit) while the caller proceeds to its fallback branch.

use duplodocs_core::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Semaphore-bounded wrapper around `spawn_blocking`.
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(permits.max(1))),
        }
    }

    /// Run a blocking closure on the pool and await its result.
    pub async fn run<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| AppError::Other("Worker pool closed".to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f()
        });

        handle
            .await
            .map_err(|e| AppError::Other(format!("Worker task failed: {}", e)))
    }
}

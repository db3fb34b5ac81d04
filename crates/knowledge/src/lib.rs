//! Evidence layer for the duplodocs assistant.
//!
//! Owns the documentation corpus and its vector index:
//! - [`corpus`] loads `.md`/`.txt` files and splits them into
//!   paragraph-bounded chunks;
//! - [`embeddings`] turns text into unit vectors (deterministic trigram
//!   provider by default, Ollama optionally);
//! - [`store`] persists chunk embeddings in SQLite and answers
//!   nearest-neighbor queries by cosine distance;
//! - [`classifier`] decides whether a query belongs to the documentation
//!   domain at all.

pub mod classifier;
pub mod corpus;
pub mod embeddings;
pub mod store;

// Re-export commonly used types
pub use classifier::DomainClassifier;
pub use corpus::{load_corpus, Document, EvidenceChunk};
pub use embeddings::{create_provider, EmbeddingProvider};
pub use store::{ChunkMetadata, EvidenceStore, StoreMatch};

use duplodocs_core::config::VectorDbConfig;
use duplodocs_core::AppResult;
use std::sync::Arc;

/// Open the evidence store and, if the collection is empty, bulk-embed the
/// corpus exactly once.
///
/// No automatic re-embedding happens after this first load; an explicit
/// re-sync (see [`EvidenceStore::reset`]) is the only way to rebuild the
/// collection.
pub fn bootstrap_store(
    config: &VectorDbConfig,
    corpus: &[Document],
) -> AppResult<Arc<EvidenceStore>> {
    let embedder = create_provider(&config.embedding)?;
    let store = EvidenceStore::open(&config.path, &config.collection, embedder)?;

    if store.is_empty()? {
        tracing::info!("Vector database is empty, storing document embeddings...");
        for doc in corpus {
            store.upsert(&doc.chunks())?;
            tracing::info!("Stored embeddings for document: {}", doc.title);
        }
    } else {
        tracing::info!("Vector database already contains document embeddings");
    }

    Ok(Arc::new(store))
}

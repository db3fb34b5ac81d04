//! SQLite-backed evidence store.
//!
//! One collection of chunk embeddings, addressed by directory path and
//! collection name. Distance is cosine distance over unit-normalized
//! vectors (smaller = more similar); with unit vectors this reduces to
//! `1 - dot(a, b)`.
//!
//! All methods are blocking; callers on the async scheduler go through the
//! worker pool.

use crate::corpus::EvidenceChunk;
use crate::embeddings::EmbeddingProvider;
use duplodocs_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Metadata attached to every stored chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    pub title: String,
    pub path: String,
    pub chunk_index: u32,
}

/// One nearest-neighbor match.
#[derive(Debug, Clone)]
pub struct StoreMatch {
    pub id: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Persistent nearest-neighbor index over evidence chunks.
pub struct EvidenceStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl EvidenceStore {
    /// Open (or create) the collection under `dir`.
    ///
    /// The directory and schema are created lazily; opening an existing
    /// collection leaves its contents untouched.
    pub fn open(
        dir: &Path,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;

        let db_path = dir.join(format!("{}.db", collection));
        let conn = Connection::open(&db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                path TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_title ON chunks(title);
            "#,
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create schema: {}", e)))?;

        tracing::debug!("Opened evidence store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    /// Insert or update chunks. Idempotent by chunk id.
    pub fn upsert(&self, chunks: &[EvidenceChunk]) -> AppResult<()> {
        let conn = self.lock()?;

        for chunk in chunks {
            let embedding = self.embedder.embed(&chunk.content)?;
            conn.execute(
                "INSERT OR REPLACE INTO chunks (id, title, path, chunk_index, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    chunk.id,
                    chunk.title,
                    chunk.path,
                    chunk.chunk_index as i64,
                    chunk.content,
                    embedding_to_bytes(&embedding),
                ],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;
        }

        Ok(())
    }

    /// Nearest-neighbor query by text, ordered ascending by cosine distance.
    pub fn query(&self, text: &str, k: usize) -> AppResult<Vec<StoreMatch>> {
        let query_embedding = self.embedder.embed(text)?;
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT id, title, path, chunk_index, embedding FROM chunks")
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let embedding_bytes: Vec<u8> = row.get(4)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    embedding_bytes,
                ))
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        let mut matches: Vec<StoreMatch> = Vec::new();
        for row in rows {
            let (id, title, path, chunk_index, embedding_bytes) =
                row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk row: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;

            matches.push(StoreMatch {
                id,
                metadata: ChunkMetadata {
                    title,
                    path,
                    chunk_index: chunk_index as u32,
                },
                distance: cosine_distance(&query_embedding, &embedding),
            });
        }

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(k);

        tracing::debug!("Retrieved {} matches (requested top-{})", matches.len(), k);
        Ok(matches)
    }

    /// Number of chunks in the collection.
    pub fn count(&self) -> AppResult<u32> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get::<_, i64>(0))
            .map(|n| n as u32)
            .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.count()? == 0)
    }

    /// Remove every chunk. Used by the explicit re-sync path only.
    pub fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Knowledge(format!("Failed to reset collection: {}", e)))?;
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Evidence store lock poisoned".to_string()))
    }
}

/// Cosine distance between two unit vectors.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - dot
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Corrupt embedding blob in index".to_string(),
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramEmbedder;

    fn test_store(dir: &Path) -> EvidenceStore {
        EvidenceStore::open(dir, "documentation", Arc::new(TrigramEmbedder::new(384))).unwrap()
    }

    fn chunk(title: &str, index: u32, content: &str) -> EvidenceChunk {
        EvidenceChunk {
            id: format!("{}_{}", title, index),
            title: title.to_string(),
            path: format!("{}.md", title),
            content: content.to_string(),
            chunk_index: index,
        }
    }

    #[test]
    fn test_upsert_is_idempotent_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        let chunks = vec![chunk("intro", 0, "DuploCloud automates DevOps.")];
        store.upsert(&chunks).unwrap();
        store.upsert(&chunks).unwrap();

        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_query_orders_by_ascending_distance() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        store
            .upsert(&[
                chunk("k8s", 0, "Kubernetes clusters run containerized workloads."),
                chunk("cake", 0, "Chocolate cake requires butter and sugar."),
            ])
            .unwrap();

        let matches = store.query("kubernetes workloads", 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].metadata.title, "k8s");
        assert!(matches[0].distance <= matches[1].distance);
    }

    #[test]
    fn test_query_truncates_to_k() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        store
            .upsert(&[
                chunk("a", 0, "first entry about tenants"),
                chunk("b", 0, "second entry about tenants"),
                chunk("c", 0, "third entry about tenants"),
            ])
            .unwrap();

        let matches = store.query("tenants", 1).unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_query_empty_store_returns_no_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());
        assert!(store.query("anything", 1).unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_reset_clears_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(dir.path());

        store.upsert(&[chunk("intro", 0, "some content")]).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        store.reset().unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let original = vec![0.25f32, -1.5, 3.0];
        let bytes = embedding_to_bytes(&original);
        let back = bytes_to_embedding(&bytes).unwrap();
        assert_eq!(back, original);
    }
}

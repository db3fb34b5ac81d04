//! Documentation corpus loading and chunking.

use duplodocs_core::AppResult;
use std::path::Path;
use walkdir::WalkDir;

/// A loaded documentation file.
#[derive(Debug, Clone)]
pub struct Document {
    /// File stem, unique within a corpus
    pub title: String,

    /// Path relative to the docs directory
    pub path: String,

    /// Full file content
    pub content: String,
}

/// A paragraph-bounded slice of a document, the unit of indexing.
///
/// Immutable once produced; `(title, chunk_index)` is unique within a
/// loaded corpus and the id is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceChunk {
    pub id: String,
    pub title: String,
    pub path: String,
    pub content: String,
    pub chunk_index: u32,
}

impl Document {
    /// Split the document into chunks on paragraph boundaries.
    pub fn chunks(&self) -> Vec<EvidenceChunk> {
        self.content
            .split("\n\n")
            .enumerate()
            .map(|(i, paragraph)| EvidenceChunk {
                id: format!("{}_{}", self.title, i),
                title: self.title.clone(),
                path: self.path.clone(),
                content: paragraph.to_string(),
                chunk_index: i as u32,
            })
            .collect()
    }
}

/// Load and process documentation files from a directory tree.
///
/// Only `.md` and `.txt` files are read. A missing directory yields an
/// empty corpus; unreadable files are skipped with a logged error. Neither
/// case is fatal: an empty corpus simply means the documentation path
/// answers nothing.
pub fn load_corpus(docs_dir: &Path) -> AppResult<Vec<Document>> {
    tracing::info!("Loading documentation from {:?}", docs_dir);
    let mut docs = Vec::new();

    if !docs_dir.exists() {
        tracing::warn!("Documentation directory {:?} does not exist", docs_dir);
        return Ok(docs);
    }

    for entry in WalkDir::new(docs_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extension != "md" && extension != "txt" {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let title = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                let relative = path
                    .strip_prefix(docs_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string();

                tracing::info!(
                    "Loaded documentation from {:?} (size: {} bytes)",
                    path,
                    content.len()
                );
                docs.push(Document {
                    title,
                    path: relative,
                    content,
                });
            }
            Err(e) => {
                tracing::error!("Error reading file {:?}: {}", path, e);
            }
        }
    }

    tracing::info!("Successfully loaded {} documentation files", docs.len());
    Ok(docs)
}

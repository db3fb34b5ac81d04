//! Trigram embedding provider.
//!
//! Generates deterministic embeddings from character trigrams and word
//! frequencies. Not semantically accurate like a neural model, but
//! consistent and content-dependent, which is enough for a small corpus
//! and keeps the store fully offline.

use crate::embeddings::EmbeddingProvider;
use duplodocs_core::AppResult;
use std::collections::{HashMap, HashSet};

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them",
];

/// Deterministic, offline embedding provider.
pub struct TrigramEmbedder {
    dimensions: usize,
}

impl TrigramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl EmbeddingProvider for TrigramEmbedder {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .collect();

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in &words {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Character trigrams spread each word over several dimensions.
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let mut hash = 0u64;
                for ch in window {
                    let mut buf = [0u8; 4];
                    for b in ch.encode_utf8(&mut buf).bytes() {
                        hash = hash.wrapping_mul(37).wrapping_add(u64::from(b));
                    }
                }
                let dim = (hash as usize) % self.dimensions;
                embedding[dim] += (*freq as f32).sqrt();
            }

            // Whole-word dimension
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
            let dim = (word_hash as usize) % self.dimensions;
            embedding[dim] += *freq as f32;
        }

        // Normalize to unit length so cosine distance reduces to 1 - dot.
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        Ok(embedding)
    }
}

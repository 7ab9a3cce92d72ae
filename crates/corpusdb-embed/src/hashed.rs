//! Deterministic hash-based embeddings for testing and development.
//!
//! This module provides a [`HashEmbedder`] that derives vectors from a
//! content hash instead of a model. It's useful for:
//! - Testing without network access or API keys
//! - Development builds where embedding quality does not matter
//! - Deterministic pipeline tests (identical text always embeds identically)

use async_trait::async_trait;
use corpusdb_core::{EmbedError, EmbeddingProvider};

/// Embedding dimension used when none is specified.
const DEFAULT_DIMENSION: usize = 1536;

/// Deterministic embedding provider derived from a blake3 content hash.
///
/// The 32 hash bytes are expanded cyclically to the configured dimension,
/// mapped into `[-1.0, 1.0]`, and normalized to unit length. Identical
/// inputs always produce identical vectors; there is no semantic structure.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create a hash embedder with the default dimension (1536).
    #[must_use]
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }

    /// Create a hash embedder with a custom dimension.
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let hash = blake3::hash(text.as_bytes());
        let bytes = hash.as_bytes();

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| f32::from(bytes[i % bytes.len()]) / 127.5 - 1.0)
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

//! Core traits for corpusdb components.
//!
//! This module defines the trait interfaces that the pipeline is built from:
//!
//! - [`TokenCounter`]: Measure text length in tokens
//! - [`TextSplitter`]: Split text into bounded, overlapping chunks
//! - [`EmbeddingProvider`]: Generate vector embeddings
//! - [`RecordStore`]: Persist collections, files, and chunks; similarity search
//!
//! These traits enable a pluggable architecture where different
//! implementations can be swapped without changing the rest of the system.

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{ChunkError, EmbedError, StoreError};
use crate::types::{
    ChunkParams, ChunkRecord, Collection, FileRecord, FileStatus, SearchQuery, SearchResult,
    SortOrder, StoreStats,
};

// ============================================================================
// Token Counting
// ============================================================================

/// Trait for measuring text length in tokens.
///
/// Implementations must be deterministic and pure: the same input always
/// yields the same count, with no side effects. Counting is infallible for
/// any string. The vocabulary must match whatever tokenizer the embedding
/// provider assumes, since chunk sizing is meaningless otherwise.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

// ============================================================================
// Text Splitting
// ============================================================================

/// Trait for splitting text into bounded, overlapping chunks.
///
/// Splitting is synchronous and pure: no I/O, no shared mutable state, safe
/// to call concurrently from multiple tasks.
pub trait TextSplitter: Send + Sync {
    /// Name of this splitting strategy.
    fn name(&self) -> &str;

    /// Split `text` into an ordered sequence of chunk strings.
    ///
    /// Empty or whitespace-only input yields an empty sequence; no property
    /// of the text itself is an error. Parameters are validated and a zero
    /// `max_tokens` is rejected.
    fn split(&self, text: &str, params: &ChunkParams) -> Result<Vec<String>, ChunkError>;
}

// ============================================================================
// Embedding
// ============================================================================

/// Trait for generating embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model name/identifier.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in order.
    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single query string.
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_texts(&[query]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Failed("empty embedding result".to_string()))
    }
}

// ============================================================================
// Record Storage
// ============================================================================

/// Trait for persisting collections, files, and chunks, and for running
/// similarity search over stored embeddings.
///
/// The similarity-search capability behind this trait is consumed as a black
/// box; implementations may delegate to an external engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new collection.
    async fn create_collection(
        &self,
        name: &str,
        metadata: HashMap<String, String>,
    ) -> Result<Collection, StoreError>;

    /// List collections with pagination, returning `(collections, has_more)`.
    async fn list_collections(
        &self,
        limit: usize,
        offset: usize,
        order: SortOrder,
    ) -> Result<(Vec<Collection>, bool), StoreError>;

    /// Get a collection by id.
    async fn get_collection(&self, id: Uuid) -> Result<Collection, StoreError>;

    /// Delete a collection and everything in it (cascades to files and chunks).
    async fn delete_collection(&self, id: Uuid) -> Result<(), StoreError>;

    /// Insert a file record.
    async fn insert_file(&self, record: &FileRecord) -> Result<(), StoreError>;

    /// Update the processing status of a file.
    async fn update_file_status(&self, file_id: Uuid, status: FileStatus)
        -> Result<(), StoreError>;

    /// List files in a collection.
    async fn list_files(&self, collection_id: Uuid) -> Result<Vec<FileRecord>, StoreError>;

    /// Delete a file and its chunks, returning the number of chunks removed.
    async fn delete_file(&self, file_id: Uuid) -> Result<u64, StoreError>;

    /// Insert chunks.
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<(), StoreError>;

    /// Get all chunks for a file, ordered by chunk index.
    async fn chunks_for_file(&self, file_id: Uuid) -> Result<Vec<ChunkRecord>, StoreError>;

    /// Similarity search within one collection.
    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, StoreError>;

    /// Store statistics.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}

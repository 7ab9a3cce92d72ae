//! Core types for corpusdb.
//!
//! This module contains all shared data structures used across corpusdb:
//!
//! ## Collections and Files
//! - [`Collection`]: A named collection of embedded document chunks
//! - [`FileRecord`]: A file uploaded into a collection
//! - [`FileStatus`]: Processing state of an uploaded file
//!
//! ## Chunks
//! - [`ChunkRecord`]: A persisted chunk with its embedding vector
//! - [`ChunkParams`]: Token budget and overlap for the splitter
//!
//! ## Search
//! - [`SearchQuery`]: Parameters for a similarity search
//! - [`SearchResult`]: A matching chunk with similarity score

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Collections
// ============================================================================

/// A named collection of document chunks with vector embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Unique collection identifier
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// Current collection status
    pub status: CollectionStatus,
    /// Caller-supplied metadata
    pub metadata: HashMap<String, String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Collection lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    /// Files are still being processed
    InProgress,
    /// All files processed
    Completed,
    /// Collection has expired and is pending cleanup
    Expired,
}

/// Sort order for listing operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

// ============================================================================
// Files
// ============================================================================

/// A file uploaded into a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier
    pub id: Uuid,
    /// Owning collection
    pub collection_id: Uuid,
    /// Original filename
    pub filename: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Current processing status
    pub status: FileStatus,
    /// Upload time
    pub created_at: DateTime<Utc>,
}

/// Processing status of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Chunking and embedding in progress
    InProgress,
    /// Fully processed and searchable
    Completed,
    /// Processing was cancelled
    Cancelled,
    /// Processing failed
    Failed,
}

// ============================================================================
// Chunks
// ============================================================================

/// A chunk of text from a file, with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique chunk identifier
    pub id: Uuid,
    /// Source file
    pub file_id: Uuid,
    /// Owning collection
    pub collection_id: Uuid,
    /// Position within the file (0-indexed, document order)
    pub chunk_index: u32,
    /// The chunk text
    pub content: String,
    /// Whitespace-delimited word count of the content
    pub token_count: usize,
    /// Embedding vector (None until embedded)
    pub embedding: Option<Vec<f32>>,
    /// Additional key-value metadata
    pub metadata: HashMap<String, String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Token budget configuration for the text splitter.
///
/// `max_tokens` is the per-chunk ceiling; `overlap_tokens` is the target
/// number of tokens shared between consecutive chunks. The overlap may
/// exceed the ceiling without error; the splitter degrades gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    /// Maximum tokens per chunk
    pub max_tokens: usize,
    /// Overlap budget between consecutive chunks
    pub overlap_tokens: usize,
}

impl ChunkParams {
    /// Create chunking parameters.
    #[must_use]
    pub fn new(max_tokens: usize, overlap_tokens: usize) -> Self {
        Self {
            max_tokens,
            overlap_tokens,
        }
    }

    /// Validate the parameters.
    ///
    /// Rejects a zero `max_tokens`. Any `overlap_tokens` value is accepted,
    /// including values larger than `max_tokens`.
    pub fn validate(&self) -> Result<(), crate::ChunkError> {
        if self.max_tokens == 0 {
            return Err(crate::ChunkError::InvalidConfig(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            overlap_tokens: 200,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// A similarity search over one collection.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Collection to search
    pub collection_id: Uuid,
    /// Query embedding
    pub embedding: Vec<f32>,
    /// Maximum results to return
    pub limit: usize,
    /// Minimum similarity score (results below are dropped)
    pub score_threshold: Option<f32>,
    /// Metadata equality filters (all must match)
    pub filter: HashMap<String, String>,
}

/// A search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matching chunk
    pub chunk_id: Uuid,
    /// Source file
    pub file_id: Uuid,
    /// Source filename
    pub filename: String,
    /// Position of the chunk within its file
    pub chunk_index: u32,
    /// Chunk text
    pub content: String,
    /// Cosine similarity score
    pub score: f32,
}

/// Record store statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of collections
    pub total_collections: u64,
    /// Total number of files
    pub total_files: u64,
    /// Total number of chunks
    pub total_chunks: u64,
}

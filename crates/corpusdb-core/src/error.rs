//! Error types for corpusdb.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for corpusdb operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Text extraction failed
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Chunking failed
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkError),

    /// Embedding generation failed
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbedError),

    /// Record store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Text extraction errors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file format: {0}")]
    UnsupportedType(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Chunking errors.
///
/// The splitter itself has no failure modes on well-formed input: any string
/// splits to a (possibly empty) chunk list. Only parameter validation and
/// tokenizer construction can fail.
#[derive(Error, Debug)]
pub enum ChunkError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(String),
}

/// Embedding errors.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding connection error: {0}")]
    Connection(String),

    #[error("embedding retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("embedding api key not configured")]
    MissingApiKey,

    #[error("embedding failed: {0}")]
    Failed(String),
}

/// Record store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(Uuid),

    #[error("file not found: {0}")]
    FileNotFound(Uuid),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("insert failed: {0}")]
    Insert(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Result type alias for corpusdb operations.
pub type Result<T> = std::result::Result<T, Error>;

//! # corpusdb-core
//!
//! Core types and traits for corpusdb, a vector-store service for named
//! document collections.
//!
//! This crate provides the foundational abstractions used throughout
//! corpusdb:
//!
//! - **Token Counting**: [`TokenCounter`] trait for measuring text in tokens
//! - **Text Splitting**: [`TextSplitter`] trait for chunking documents
//! - **Embedding Generation**: [`EmbeddingProvider`] trait for converting text to vectors
//! - **Record Storage**: [`RecordStore`] trait for persistence and similarity search
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline pattern:
//!
//! ```text
//! File → extract → TextSplitter → EmbeddingProvider → RecordStore
//!                                                         ↓
//!                                                SearchQuery → SearchResult
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Collection`] | A named collection of embedded chunks |
//! | [`FileRecord`] | A file uploaded into a collection |
//! | [`ChunkRecord`] | A chunk of text with its embedding |
//! | [`ChunkParams`] | Token budget and overlap for splitting |
//! | [`SearchQuery`] | Parameters for a similarity search |
//! | [`SearchResult`] | A matching chunk with similarity score |
//!
//! ## Related Crates
//!
//! - `corpusdb-chunker`: Recursive token-aware splitter implementation
//! - `corpusdb-embed`: Embedding provider implementations
//! - `corpusdb-store`: In-memory record store implementation
//! - `corpusdb-ingest`: File extraction and the ingestion pipeline

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ChunkError, EmbedError, Error, ExtractError, Result, StoreError};
pub use traits::*;
pub use types::*;

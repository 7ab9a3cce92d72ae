//! # corpusdb-chunker
//!
//! Token-aware text splitting for corpusdb.
//!
//! Splitting is the step between extraction and embedding: raw document text
//! becomes an ordered sequence of bounded, overlapping chunks. Chunk size is
//! measured in tokens of the same vocabulary the embedding provider uses, so
//! the budget here matches what the provider bills and truncates against.
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RecursiveSplitter`] | Recursive separator-descent splitter with greedy merge and backward overlap |
//! | [`BpeTokenCounter`] | o200k BPE token counter, shareable process-wide |
//!
//! ## Usage
//!
//! ```rust
//! use corpusdb_chunker::{BpeTokenCounter, RecursiveSplitter};
//! use corpusdb_core::{ChunkParams, TextSplitter};
//!
//! let splitter = RecursiveSplitter::new(BpeTokenCounter::shared());
//! let chunks = splitter
//!     .split("Hello world", &ChunkParams::new(800, 200))
//!     .unwrap();
//! assert_eq!(chunks, vec!["Hello world".to_string()]);
//! ```

pub mod splitter;
pub mod token;

pub use splitter::RecursiveSplitter;
pub use token::BpeTokenCounter;

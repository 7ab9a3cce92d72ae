//! # corpusdb-embed
//!
//! Embedding providers for corpusdb.
//!
//! The embedding model itself is an external collaborator: this crate only
//! implements the boundary — a network client for an OpenAI-compatible
//! endpoint, a deterministic hash-based provider for tests and development,
//! and a concurrency-limiting pool shared by both.
//!
//! ## Cargo Features
//!
//! - `openai` (default): Enables the reqwest-backed network provider
//! - Without `openai`: Only [`HashEmbedder`] is available
//!
//! ## Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`OpenAiEmbedder`] | OpenAI-compatible client with batching and retry (requires `openai` feature) |
//! | [`HashEmbedder`] | Deterministic hash-based provider (always available) |
//! | [`EmbedderPool`] | Concurrent embedding with semaphore limiting (always available) |
//!
//! ## Retry behavior
//!
//! The network provider retries rate limits (429), server errors (500, 502,
//! 503, 504), and connection failures up to 5 times with exponential
//! backoff starting at one second. Client errors fail immediately. Requests
//! are batched at 2048 inputs, the endpoint's documented ceiling.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use corpusdb_embed::{EmbedderPool, HashEmbedder, OpenAiEmbedder};
//! use std::sync::Arc;
//!
//! let provider = OpenAiEmbedder::new(api_key, "text-embedding-3-small", 1536);
//! let pool = EmbedderPool::new(Arc::new(provider), 4);
//!
//! let embeddings = pool.embed_batch(&["Hello world"]).await?;
//! ```

// Network provider (optional)
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiEmbedder;

// Always available modules
pub mod hashed;
pub mod pool;

pub use hashed::HashEmbedder;
pub use pool::EmbedderPool;

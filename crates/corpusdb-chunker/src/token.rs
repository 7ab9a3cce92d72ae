//! Token counting backed by the o200k BPE vocabulary.

use corpusdb_core::{ChunkError, TokenCounter};
use std::sync::{Arc, OnceLock};
use tiktoken_rs::CoreBPE;
use tracing::info;

/// Token counter over the o200k byte-pair vocabulary.
///
/// This is the vocabulary the configured embedding models bill and limit
/// against, so chunk sizes measured here correspond to what the provider
/// sees. Construction is expensive (the vocabulary is parsed once);
/// counting is cheap and reentrant. Use [`BpeTokenCounter::shared`] to
/// amortize construction across the process.
pub struct BpeTokenCounter {
    bpe: CoreBPE,
}

impl BpeTokenCounter {
    /// Build a counter from the embedded o200k vocabulary.
    pub fn new() -> Result<Self, ChunkError> {
        let bpe = tiktoken_rs::o200k_base().map_err(|e| ChunkError::Tokenizer(e.to_string()))?;
        Ok(Self { bpe })
    }

    /// Process-wide shared instance, built on first use.
    ///
    /// The vocabulary data ships embedded in the tiktoken-rs crate, so
    /// construction here cannot fail for environmental reasons.
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<BpeTokenCounter>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| {
            info!("loading o200k tokenizer vocabulary");
            Arc::new(Self::new().expect("embedded o200k vocabulary failed to load"))
        }))
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

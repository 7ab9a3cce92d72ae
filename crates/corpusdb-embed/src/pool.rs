//! Embedder pool for concurrent embedding operations.

use corpusdb_core::{EmbedError, EmbeddingProvider};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Pool wrapping an embedding provider with concurrency control.
pub struct EmbedderPool {
    /// Underlying provider
    provider: Arc<dyn EmbeddingProvider>,
    /// Semaphore limiting concurrent requests
    semaphore: Semaphore,
    /// Maximum concurrent operations
    max_concurrent: usize,
}

impl EmbedderPool {
    /// Create a new embedder pool.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, max_concurrent: usize) -> Self {
        Self {
            provider,
            semaphore: Semaphore::new(max_concurrent),
            max_concurrent,
        }
    }

    /// Get the embedding dimension.
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Get the model name.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.provider)
    }

    /// Embed a batch of texts.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EmbedError::Failed(format!("semaphore error: {e}")))?;

        self.provider.embed_texts(texts).await
    }

    /// Embed a single query.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, EmbedError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EmbedError::Failed(format!("semaphore error: {e}")))?;

        self.provider.embed_query(query).await
    }

    /// Get currently available permits.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Get max concurrent operations.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashEmbedder;

    const TEST_DIM: usize = 64;

    fn test_pool(max_concurrent: usize) -> EmbedderPool {
        EmbedderPool::new(
            Arc::new(HashEmbedder::with_dimension(TEST_DIM)),
            max_concurrent,
        )
    }

    #[tokio::test]
    async fn test_pool_creation() {
        let pool = test_pool(4);
        assert_eq!(pool.dimension(), TEST_DIM);
        assert_eq!(pool.model_name(), "hash");
        assert_eq!(pool.max_concurrent(), 4);
        assert_eq!(pool.available_permits(), 4);
    }

    #[tokio::test]
    async fn test_embed_batch() {
        let pool = test_pool(4);
        let results = pool
            .embed_batch(&["hello world", "test embedding"])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].len(), TEST_DIM);
        assert_eq!(results[1].len(), TEST_DIM);
    }

    #[tokio::test]
    async fn test_embed_query() {
        let pool = test_pool(4);
        let result = pool.embed_query("search query").await.unwrap();
        assert_eq!(result.len(), TEST_DIM);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let pool = test_pool(4);
        let results = pool.embed_batch(&[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_permits_returned_after_use() {
        let pool = Arc::new(test_pool(2));

        let pool1 = Arc::clone(&pool);
        let pool2 = Arc::clone(&pool);

        let handle1 = tokio::spawn(async move {
            let _ = pool1.embed_query("query1").await;
        });
        let handle2 = tokio::spawn(async move {
            let _ = pool2.embed_query("query2").await;
        });

        let _ = handle1.await;
        let _ = handle2.await;

        assert_eq!(pool.available_permits(), 2);
    }

    #[tokio::test]
    async fn test_provider_access() {
        let pool = test_pool(4);
        let provider = pool.provider();
        assert_eq!(provider.dimension(), TEST_DIM);
        assert_eq!(provider.model_name(), "hash");
    }
}

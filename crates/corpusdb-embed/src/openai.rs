//! OpenAI-compatible embedding provider with batching and retry.

use async_trait::async_trait;
use corpusdb_core::{EmbedError, EmbeddingProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// The embeddings endpoint accepts up to 2048 inputs per request.
const MAX_BATCH_SIZE: usize = 2048;

/// Retry configuration for transient failures.
const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const BACKOFF_FACTOR: f64 = 2.0;
const RETRYABLE_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Embedding provider backed by an OpenAI-compatible `/embeddings` endpoint.
///
/// Large inputs are split into batches of at most 2048 texts. Rate limits
/// and server errors are retried with exponential backoff; client errors
/// propagate immediately.
pub struct OpenAiEmbedder {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [&'a str],
    model: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create a provider for the given model and output dimension.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            dimension,
        }
    }

    /// Override the endpoint base URL (for compatible self-hosted servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, batch: &[&str]) -> Result<EmbeddingResponse, EmbedError> {
        let request = EmbeddingRequest {
            input: batch,
            model: &self.model,
            dimensions: self.dimension,
        };

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbedError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| EmbedError::Failed(format!("malformed embeddings response: {e}")))
    }

    /// Call the endpoint, retrying transient failures with exponential
    /// backoff.
    async fn call_with_retry(&self, batch: &[&str]) -> Result<EmbeddingResponse, EmbedError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut last: Option<EmbedError> = None;

        for attempt in 1..=MAX_RETRIES {
            match self.call(batch).await {
                Ok(response) => return Ok(response),
                Err(err) if is_retryable(&err) => {
                    warn!(
                        "transient embedding failure (attempt {attempt}/{MAX_RETRIES}), \
                         retrying in {backoff:?}: {err}"
                    );
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }

            tokio::time::sleep(backoff).await;
            backoff = backoff.mul_f64(BACKOFF_FACTOR);
        }

        Err(EmbedError::RetriesExhausted {
            attempts: MAX_RETRIES,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}

/// Whether an error is worth retrying: rate limits, server errors, and
/// connection failures. Client errors are not.
fn is_retryable(err: &EmbedError) -> bool {
    match err {
        EmbedError::Connection(_) => true,
        EmbedError::Api { status, .. } => RETRYABLE_STATUS_CODES.contains(status),
        _ => false,
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut all_embeddings = vec![Vec::new(); texts.len()];

        for (batch_idx, batch) in texts.chunks(MAX_BATCH_SIZE).enumerate() {
            let batch_start = batch_idx * MAX_BATCH_SIZE;
            debug!(
                "embedding batch of {} texts (offset {batch_start})",
                batch.len()
            );

            let response = self.call_with_retry(batch).await?;
            if response.data.len() != batch.len() {
                return Err(EmbedError::Failed(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    response.data.len()
                )));
            }

            // Items are ordered by index within the batch.
            for item in response.data {
                let slot = batch_start + item.index;
                if slot >= all_embeddings.len() {
                    return Err(EmbedError::Failed(format!(
                        "embedding index {} out of range",
                        item.index
                    )));
                }
                all_embeddings[slot] = item.embedding;
            }
        }

        Ok(all_embeddings)
    }
}

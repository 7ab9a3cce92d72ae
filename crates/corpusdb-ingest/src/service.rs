//! File ingestion and search over a record store.

use chrono::Utc;
use corpusdb_core::{
    ChunkParams, ChunkRecord, FileRecord, FileStatus, RecordStore, Result, SearchQuery,
    SearchResult, TextSplitter,
};
use corpusdb_embed::EmbedderPool;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extract;

/// Ingestion pipeline: extract → split → embed → persist.
///
/// One instance serves a whole process; all state lives in the store.
pub struct IngestService {
    store: Arc<dyn RecordStore>,
    splitter: Arc<dyn TextSplitter>,
    embedder: Arc<EmbedderPool>,
    params: ChunkParams,
    batch_size: usize,
}

impl IngestService {
    /// Create an ingestion service.
    pub fn new(
        store: Arc<dyn RecordStore>,
        splitter: Arc<dyn TextSplitter>,
        embedder: Arc<EmbedderPool>,
        params: ChunkParams,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            splitter,
            embedder,
            params,
            batch_size: batch_size.max(1),
        }
    }

    /// Ingest one file into a collection.
    ///
    /// The file record is persisted as `InProgress` before processing and
    /// moved to `Completed` or `Failed` afterwards. Returns the record and
    /// the number of chunks stored; an empty file completes with zero
    /// chunks.
    pub async fn ingest_file(
        &self,
        collection_id: Uuid,
        path: &Path,
    ) -> Result<(FileRecord, usize)> {
        self.store.get_collection(collection_id).await?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let text = extract::read_text(path).await?;

        let mut record = FileRecord {
            id: Uuid::new_v4(),
            collection_id,
            filename,
            size_bytes: text.len() as u64,
            status: FileStatus::InProgress,
            created_at: Utc::now(),
        };
        self.store.insert_file(&record).await?;

        match self.process(&record, &text).await {
            Ok(chunk_count) => {
                self.store
                    .update_file_status(record.id, FileStatus::Completed)
                    .await?;
                record.status = FileStatus::Completed;
                info!(
                    "Ingested {:?} ({} chunks)",
                    record.filename, chunk_count
                );
                Ok((record, chunk_count))
            }
            Err(e) => {
                if let Err(status_err) = self
                    .store
                    .update_file_status(record.id, FileStatus::Failed)
                    .await
                {
                    warn!(
                        "Failed to mark {:?} as failed: {}",
                        record.filename, status_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Split, embed, and persist the chunks of one file.
    async fn process(&self, record: &FileRecord, text: &str) -> Result<usize> {
        let chunks = self.splitter.split(text, &self.params)?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            embeddings.extend(self.embedder.embed_batch(&refs).await?);
        }

        let now = Utc::now();
        let records: Vec<ChunkRecord> = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(idx, (content, embedding))| ChunkRecord {
                id: Uuid::new_v4(),
                file_id: record.id,
                collection_id: record.collection_id,
                chunk_index: idx as u32,
                content: content.clone(),
                token_count: content.split_whitespace().count(),
                embedding: Some(embedding),
                metadata: HashMap::new(),
                created_at: now,
            })
            .collect();

        self.store.insert_chunks(&records).await?;
        Ok(records.len())
    }

    /// Embed a query string and run a similarity search over one collection.
    pub async fn search(
        &self,
        collection_id: Uuid,
        query: &str,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed_query(query).await?;

        let results = self
            .store
            .search(SearchQuery {
                collection_id,
                embedding,
                limit,
                score_threshold,
                filter: HashMap::new(),
            })
            .await?;

        Ok(results)
    }

    /// The record store backing this service.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }
}

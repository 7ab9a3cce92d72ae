//! In-memory record store.
//!
//! This module provides a [`MemoryStore`] that keeps collections, files, and
//! chunks in process memory. Similarity search is brute-force cosine over
//! the requested collection. It's useful for:
//! - Tests and development without an external database
//! - The CLI's ephemeral, single-invocation sessions
//!
//! It is not a vector index; a production deployment would put a real
//! similarity-search engine behind the same trait.

use async_trait::async_trait;
use chrono::Utc;
use corpusdb_core::{
    ChunkRecord, Collection, CollectionStatus, FileRecord, FileStatus, RecordStore, SearchQuery,
    SearchResult, SortOrder, StoreError, StoreStats,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// In-memory record store with brute-force cosine search.
///
/// # Example
///
/// ```rust
/// use corpusdb_store::MemoryStore;
/// use corpusdb_core::RecordStore;
/// use std::collections::HashMap;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new(1536);
/// let collection = store.create_collection("docs", HashMap::new()).await?;
/// assert_eq!(collection.name, "docs");
/// # Ok(())
/// # }
/// ```
pub struct MemoryStore {
    dimension: usize,
    collections: Arc<RwLock<HashMap<Uuid, Collection>>>,
    files: Arc<RwLock<HashMap<Uuid, FileRecord>>>,
    chunks: Arc<RwLock<HashMap<Uuid, ChunkRecord>>>,
}

impl MemoryStore {
    /// Create a new in-memory store with the given embedding dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            collections: Arc::new(RwLock::new(HashMap::new())),
            files: Arc::new(RwLock::new(HashMap::new())),
            chunks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Compute cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(1536)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_collection(
        &self,
        name: &str,
        metadata: HashMap<String, String>,
    ) -> Result<Collection, StoreError> {
        let collection = Collection {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: CollectionStatus::Completed,
            metadata,
            created_at: Utc::now(),
        };

        let mut collections = self.collections.write().await;
        collections.insert(collection.id, collection.clone());
        debug!("Created collection {:?} ({})", collection.name, collection.id);
        Ok(collection)
    }

    async fn list_collections(
        &self,
        limit: usize,
        offset: usize,
        order: SortOrder,
    ) -> Result<(Vec<Collection>, bool), StoreError> {
        let collections = self.collections.read().await;
        let mut all: Vec<Collection> = collections.values().cloned().collect();
        all.sort_by(|a, b| match order {
            SortOrder::Asc => a.created_at.cmp(&b.created_at),
            SortOrder::Desc => b.created_at.cmp(&a.created_at),
        });

        // Fetch one past the page to detect whether more remain.
        let mut page: Vec<Collection> = all.into_iter().skip(offset).take(limit + 1).collect();
        let has_more = page.len() > limit;
        page.truncate(limit);

        Ok((page, has_more))
    }

    async fn get_collection(&self, id: Uuid) -> Result<Collection, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(&id)
            .cloned()
            .ok_or(StoreError::CollectionNotFound(id))
    }

    async fn delete_collection(&self, id: Uuid) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if collections.remove(&id).is_none() {
            return Err(StoreError::CollectionNotFound(id));
        }

        let mut files = self.files.write().await;
        let mut chunks = self.chunks.write().await;
        files.retain(|_, f| f.collection_id != id);
        chunks.retain(|_, c| c.collection_id != id);

        debug!("Deleted collection {id} and its contents");
        Ok(())
    }

    async fn insert_file(&self, record: &FileRecord) -> Result<(), StoreError> {
        {
            let collections = self.collections.read().await;
            if !collections.contains_key(&record.collection_id) {
                return Err(StoreError::CollectionNotFound(record.collection_id));
            }
        }

        let mut files = self.files.write().await;
        files.insert(record.id, record.clone());
        debug!("Inserted file record {:?}", record.filename);
        Ok(())
    }

    async fn update_file_status(
        &self,
        file_id: Uuid,
        status: FileStatus,
    ) -> Result<(), StoreError> {
        let mut files = self.files.write().await;
        let record = files
            .get_mut(&file_id)
            .ok_or(StoreError::FileNotFound(file_id))?;
        record.status = status;
        Ok(())
    }

    async fn list_files(&self, collection_id: Uuid) -> Result<Vec<FileRecord>, StoreError> {
        {
            let collections = self.collections.read().await;
            if !collections.contains_key(&collection_id) {
                return Err(StoreError::CollectionNotFound(collection_id));
            }
        }

        let files = self.files.read().await;
        let mut result: Vec<FileRecord> = files
            .values()
            .filter(|f| f.collection_id == collection_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn delete_file(&self, file_id: Uuid) -> Result<u64, StoreError> {
        let mut files = self.files.write().await;
        if files.remove(&file_id).is_none() {
            return Err(StoreError::FileNotFound(file_id));
        }

        let mut chunks = self.chunks.write().await;
        let before = chunks.len();
        chunks.retain(|_, c| c.file_id != file_id);
        let deleted = (before - chunks.len()) as u64;

        debug!("Deleted file {file_id} ({deleted} chunks)");
        Ok(deleted)
    }

    async fn insert_chunks(&self, records: &[ChunkRecord]) -> Result<(), StoreError> {
        for record in records {
            if let Some(embedding) = &record.embedding {
                if embedding.len() != self.dimension {
                    return Err(StoreError::DimensionMismatch {
                        expected: self.dimension,
                        got: embedding.len(),
                    });
                }
            }
        }

        let mut chunks = self.chunks.write().await;
        for record in records {
            chunks.insert(record.id, record.clone());
        }
        debug!("Inserted {} chunks", records.len());
        Ok(())
    }

    async fn chunks_for_file(&self, file_id: Uuid) -> Result<Vec<ChunkRecord>, StoreError> {
        let chunks = self.chunks.read().await;
        let mut result: Vec<ChunkRecord> = chunks
            .values()
            .filter(|c| c.file_id == file_id)
            .cloned()
            .collect();
        result.sort_by_key(|c| c.chunk_index);
        Ok(result)
    }

    async fn search(&self, query: SearchQuery) -> Result<Vec<SearchResult>, StoreError> {
        {
            let collections = self.collections.read().await;
            if !collections.contains_key(&query.collection_id) {
                return Err(StoreError::CollectionNotFound(query.collection_id));
            }
        }

        if query.embedding.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                got: query.embedding.len(),
            });
        }

        let chunks = self.chunks.read().await;
        let files = self.files.read().await;

        let mut scored: Vec<(f32, &ChunkRecord)> = Vec::new();
        for chunk in chunks.values() {
            if chunk.collection_id != query.collection_id {
                continue;
            }
            let Some(embedding) = &chunk.embedding else {
                continue;
            };
            if !query
                .filter
                .iter()
                .all(|(k, v)| chunk.metadata.get(k) == Some(v))
            {
                continue;
            }

            let score = Self::cosine_similarity(&query.embedding, embedding);
            if let Some(threshold) = query.score_threshold {
                if score < threshold {
                    continue;
                }
            }
            scored.push((score, chunk));
        }

        // Rank by similarity, best first.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let results = scored
            .into_iter()
            .take(query.limit)
            .map(|(score, chunk)| SearchResult {
                chunk_id: chunk.id,
                file_id: chunk.file_id,
                filename: files
                    .get(&chunk.file_id)
                    .map(|f| f.filename.clone())
                    .unwrap_or_default(),
                chunk_index: chunk.chunk_index,
                content: chunk.content.clone(),
                score,
            })
            .collect();

        Ok(results)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let collections = self.collections.read().await;
        let files = self.files.read().await;
        let chunks = self.chunks.read().await;

        Ok(StoreStats {
            total_collections: collections.len() as u64,
            total_files: files.len() as u64,
            total_chunks: chunks.len() as u64,
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use recall_core::{
    validate_collection_name, validate_key, MemoryRecord, MemoryStore, RecordStream, Result,
    ScoredEntry, StoredEntry, VectorBackend,
};

/// [`MemoryStore`] implementation over any [`VectorBackend`].
///
/// Converts [`MemoryRecord`]s to the backend's [`StoredEntry`] shape and
/// back, assigns missing timestamps, and rejects blank collection names
/// before the backend is touched.
///
/// # Example
///
/// ```rust,no_run
/// use recall_store::{InMemoryBackend, RecordStore};
/// use recall_core::{MemoryRecord, MemoryStore};
///
/// # async fn example() -> Result<(), recall_core::RecallError> {
/// let store = RecordStore::from_backend(InMemoryBackend::new());
/// store.create_collection("notes").await?;
///
/// let record = MemoryRecord::local_record("n1", "buy milk", "", vec![0.1, 0.2], "", None);
/// let key = store.upsert("notes", record).await?;
/// assert_eq!(key, "n1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn VectorBackend>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn VectorBackend>) -> Self {
        Self { backend }
    }

    /// Wrap a concrete backend.
    pub fn from_backend<B: VectorBackend + 'static>(backend: B) -> Self {
        Self::new(Arc::new(backend))
    }

    /// The backend this store dispatches to.
    pub fn backend(&self) -> &Arc<dyn VectorBackend> {
        &self.backend
    }

    async fn upsert_one(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        validate_key(record.key())?;
        let entry = record_to_entry(record)?;
        self.backend.upsert_entry(collection, entry).await
    }
}

/// Convert a record to its stored shape, stamping it with the current time
/// when it carries no timestamp.
fn record_to_entry(record: MemoryRecord) -> Result<StoredEntry> {
    let metadata = record.metadata.to_json()?;
    Ok(StoredEntry {
        key: record.key().to_string(),
        metadata,
        timestamp: Some(record.timestamp.unwrap_or_else(Utc::now)),
        embedding: Some(record.embedding),
    })
}

fn entry_to_record(entry: StoredEntry) -> Result<MemoryRecord> {
    MemoryRecord::from_json_metadata(
        &entry.metadata,
        entry.embedding,
        entry.key,
        entry.timestamp,
    )
}

fn scored_to_match(scored: ScoredEntry) -> Result<(MemoryRecord, f64)> {
    Ok((entry_to_record(scored.entry)?, scored.score))
}

#[async_trait]
impl MemoryStore for RecordStore {
    async fn create_collection(&self, collection: &str) -> Result<()> {
        validate_collection_name(collection)?;
        self.backend.create_collection(collection).await
    }

    async fn does_collection_exist(&self, collection: &str) -> Result<bool> {
        validate_collection_name(collection)?;
        self.backend.collection_exists(collection).await
    }

    fn get_collections(&self) -> RecordStream<'_, String> {
        self.backend.list_collections()
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        validate_collection_name(collection)?;
        self.backend.drop_collection(collection).await
    }

    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String> {
        validate_collection_name(collection)?;
        self.upsert_one(collection, record).await
    }

    fn upsert_batch<'a>(
        &'a self,
        collection: &'a str,
        records: Vec<MemoryRecord>,
    ) -> RecordStream<'a, String> {
        Box::pin(async_stream::stream! {
            if let Err(e) = validate_collection_name(collection) {
                yield Err(e);
                return;
            }
            let total = records.len();
            for (written, record) in records.into_iter().enumerate() {
                match self.upsert_one(collection, record).await {
                    Ok(key) => yield Ok(key),
                    Err(e) => {
                        tracing::warn!(
                            collection,
                            written,
                            total,
                            "batch upsert stopped after a failed record"
                        );
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>> {
        validate_collection_name(collection)?;
        self.backend
            .get_entry(collection, key, with_embedding)
            .await?
            .map(entry_to_record)
            .transpose()
    }

    fn get_batch<'a>(
        &'a self,
        collection: &'a str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'a, MemoryRecord> {
        Box::pin(async_stream::stream! {
            if let Err(e) = validate_collection_name(collection) {
                yield Err(e);
                return;
            }
            if keys.is_empty() {
                return;
            }
            let mut entries = self.backend.get_entries(collection, keys, with_embedding);
            while let Some(entry) = entries.next().await {
                yield entry.and_then(entry_to_record);
            }
        })
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<()> {
        validate_collection_name(collection)?;
        self.backend.delete_entry(collection, key).await
    }

    async fn remove_batch(&self, collection: &str, keys: &[String]) -> Result<()> {
        validate_collection_name(collection)?;
        if keys.is_empty() {
            return Ok(());
        }
        self.backend.delete_entries(collection, keys).await
    }

    async fn get_nearest_match(
        &self,
        collection: &str,
        embedding: &[f32],
        min_relevance_score: f64,
        with_embedding: bool,
    ) -> Result<Option<(MemoryRecord, f64)>> {
        let mut matches = self.get_nearest_matches(
            collection,
            embedding.to_vec(),
            1,
            min_relevance_score,
            with_embedding,
        );
        matches.next().await.transpose()
    }

    fn get_nearest_matches<'a>(
        &'a self,
        collection: &'a str,
        embedding: Vec<f32>,
        limit: usize,
        min_relevance_score: f64,
        with_embedding: bool,
    ) -> RecordStream<'a, (MemoryRecord, f64)> {
        Box::pin(async_stream::stream! {
            if let Err(e) = validate_collection_name(collection) {
                yield Err(e);
                return;
            }
            if limit == 0 {
                return;
            }
            let mut matches = self.backend.nearest_entries(
                collection,
                embedding,
                limit,
                min_relevance_score,
                with_embedding,
            );
            while let Some(scored) = matches.next().await {
                yield scored.and_then(scored_to_match);
            }
        })
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

use async_trait::async_trait;

use crate::error::{RecallError, Result};
use crate::record::MemoryRecord;
use crate::RecordStream;

/// The memory-store contract consumed by the host framework.
///
/// Reads and deletes of absent collections or keys are not errors: they
/// yield `None`, an empty stream, or `Ok(())`. Batch operations apply each
/// item independently; there is no rollback.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Create a collection. No-op if it already exists.
    async fn create_collection(&self, collection: &str) -> Result<()>;

    async fn does_collection_exist(&self, collection: &str) -> Result<bool>;

    /// Stream the names of all collections.
    fn get_collections(&self) -> RecordStream<'_, String>;

    /// Delete a collection. No-op if it does not exist.
    async fn delete_collection(&self, collection: &str) -> Result<()>;

    /// Insert or fully replace `record`, returning its key.
    async fn upsert(&self, collection: &str, record: MemoryRecord) -> Result<String>;

    /// Upsert each record in order, yielding keys as they are written.
    fn upsert_batch<'a>(
        &'a self,
        collection: &'a str,
        records: Vec<MemoryRecord>,
    ) -> RecordStream<'a, String>;

    async fn get(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<MemoryRecord>>;

    /// Stream the records stored under `keys`, skipping keys with no record.
    fn get_batch<'a>(
        &'a self,
        collection: &'a str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'a, MemoryRecord>;

    /// Remove a record. No-op if it does not exist.
    async fn remove(&self, collection: &str, key: &str) -> Result<()>;

    async fn remove_batch(&self, collection: &str, keys: &[String]) -> Result<()>;

    /// The single best match for `embedding`, if any scores at least
    /// `min_relevance_score`.
    async fn get_nearest_match(
        &self,
        collection: &str,
        embedding: &[f32],
        min_relevance_score: f64,
        with_embedding: bool,
    ) -> Result<Option<(MemoryRecord, f64)>>;

    /// Up to `limit` matches in descending score order. `limit == 0` yields
    /// nothing.
    fn get_nearest_matches<'a>(
        &'a self,
        collection: &'a str,
        embedding: Vec<f32>,
        limit: usize,
        min_relevance_score: f64,
        with_embedding: bool,
    ) -> RecordStream<'a, (MemoryRecord, f64)>;
}

/// Reject empty or whitespace-only collection names.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RecallError::InvalidArgument(
            "collection name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Reject empty or whitespace-only record keys.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(RecallError::InvalidArgument(
            "record key must not be empty".to_string(),
        ));
    }
    Ok(())
}

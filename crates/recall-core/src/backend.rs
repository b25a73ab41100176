use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::RecordStream;

/// A record in the shape backends persist it: metadata as an opaque JSON
/// string and the embedding only when it was written or requested.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub key: String,
    pub metadata: String,
    pub embedding: Option<Vec<f32>>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// A [`StoredEntry`] paired with the relevance score the backend assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: StoredEntry,
    pub score: f64,
}

/// Driver adapter for a concrete storage backend.
///
/// `recall_store::RecordStore` depends only on this trait.
/// Implementations never retry; driver faults are returned as
/// [`RecallError::Backend`](crate::RecallError::Backend).
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Create the collection unless it already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    async fn collection_exists(&self, name: &str) -> Result<bool>;

    fn list_collections(&self) -> RecordStream<'_, String>;

    /// Drop the collection if it exists.
    async fn drop_collection(&self, name: &str) -> Result<()>;

    /// Replace every field of the entry stored under `entry.key`, creating
    /// it when absent. Returns the key.
    async fn upsert_entry(&self, collection: &str, entry: StoredEntry) -> Result<String>;

    async fn get_entry(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<StoredEntry>>;

    /// Fetch the entries for `keys`. Missing keys are skipped.
    fn get_entries(
        &self,
        collection: &str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'_, StoredEntry>;

    async fn delete_entry(&self, collection: &str, key: &str) -> Result<()>;

    async fn delete_entries(&self, collection: &str, keys: &[String]) -> Result<()>;

    /// Up to `limit` entries ranked by descending relevance to `query`,
    /// excluding those scoring below `min_score`.
    fn nearest_entries(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: usize,
        min_score: f64,
        with_embedding: bool,
    ) -> RecordStream<'_, ScoredEntry>;
}

/// Cosine similarity between two vectors, computed in `f64`.
///
/// Mismatched lengths, empty vectors and zero vectors score `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Score `candidates` against `query`, drop those below `min_score`, sort by
/// descending score and keep at most `limit`.
///
/// Shared by backends that rank in process.
pub fn rank_entries<I>(
    query: &[f32],
    candidates: I,
    limit: usize,
    min_score: f64,
) -> Vec<ScoredEntry>
where
    I: IntoIterator<Item = StoredEntry>,
{
    if limit == 0 {
        return Vec::new();
    }
    let mut scored: Vec<ScoredEntry> = candidates
        .into_iter()
        .filter_map(|entry| {
            let score = entry
                .embedding
                .as_deref()
                .map(|e| cosine_similarity(query, e))
                .unwrap_or(0.0);
            (score >= min_score).then_some(ScoredEntry { entry, score })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use recall_core::{
    rank_entries, RecallError, RecordStream, Result, ScoredEntry, StoredEntry, VectorBackend,
};
use tokio::sync::RwLock;

type Collection = BTreeMap<String, StoredEntry>;

/// In-memory [`VectorBackend`] ranking by cosine similarity.
///
/// Nothing is persisted; intended for tests and ephemeral use. Writes into a
/// collection that was never created fail with
/// [`RecallError::CollectionNotFound`].
#[derive(Default)]
pub struct InMemoryBackend {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn project(entry: &StoredEntry, with_embedding: bool) -> StoredEntry {
    StoredEntry {
        key: entry.key.clone(),
        metadata: entry.metadata.clone(),
        embedding: if with_embedding {
            entry.embedding.clone()
        } else {
            None
        },
        timestamp: entry.timestamp,
    }
}

#[async_trait]
impl VectorBackend for InMemoryBackend {
    async fn create_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().await.contains_key(name))
    }

    fn list_collections(&self) -> RecordStream<'_, String> {
        Box::pin(async_stream::stream! {
            let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
            names.sort();
            for name in names {
                yield Ok(name);
            }
        })
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        self.collections.write().await.remove(name);
        Ok(())
    }

    async fn upsert_entry(&self, collection: &str, entry: StoredEntry) -> Result<String> {
        let mut collections = self.collections.write().await;
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| RecallError::CollectionNotFound(collection.to_string()))?;
        let key = entry.key.clone();
        entries.insert(key.clone(), entry);
        Ok(key)
    }

    async fn get_entry(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<StoredEntry>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|entries| entries.get(key))
            .map(|entry| project(entry, with_embedding)))
    }

    fn get_entries(
        &self,
        collection: &str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'_, StoredEntry> {
        let collection = collection.to_string();
        Box::pin(async_stream::stream! {
            let found: Vec<StoredEntry> = {
                let collections = self.collections.read().await;
                match collections.get(&collection) {
                    Some(entries) => keys
                        .iter()
                        .filter_map(|k| entries.get(k))
                        .map(|entry| project(entry, with_embedding))
                        .collect(),
                    None => Vec::new(),
                }
            };
            for entry in found {
                yield Ok(entry);
            }
        })
    }

    async fn delete_entry(&self, collection: &str, key: &str) -> Result<()> {
        if let Some(entries) = self.collections.write().await.get_mut(collection) {
            entries.remove(key);
        }
        Ok(())
    }

    async fn delete_entries(&self, collection: &str, keys: &[String]) -> Result<()> {
        if let Some(entries) = self.collections.write().await.get_mut(collection) {
            for key in keys {
                entries.remove(key);
            }
        }
        Ok(())
    }

    fn nearest_entries(
        &self,
        collection: &str,
        query: Vec<f32>,
        limit: usize,
        min_score: f64,
        with_embedding: bool,
    ) -> RecordStream<'_, ScoredEntry> {
        let collection = collection.to_string();
        Box::pin(async_stream::stream! {
            let ranked = {
                let collections = self.collections.read().await;
                match collections.get(&collection) {
                    Some(entries) => rank_entries(&query, entries.values().cloned(), limit, min_score),
                    None => Vec::new(),
                }
            };
            for mut scored in ranked {
                if !with_embedding {
                    scored.entry.embedding = None;
                }
                yield Ok(scored);
            }
        })
    }
}

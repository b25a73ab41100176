use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use recall_core::{RecallError, RecordStream, Result, ScoredEntry, StoredEntry, VectorBackend};

use crate::config::{check_limit, MongoBackendConfig};
use crate::documents::{
    document_to_entry, document_to_scored, key_filter, keys_filter, projection, search_pipeline,
    upsert_update,
};

/// MongoDB Atlas implementation of the [`VectorBackend`] trait.
///
/// Each memory collection maps to one MongoDB collection in the configured
/// database. Documents have the shape
/// `{ _id: <key>, metadata: <json string>, embedding: [<double>], timestamp: <date> }`.
/// Similarity search runs server-side through `$vectorSearch`, which needs an
/// Atlas Vector Search index on each collection.
///
/// Timestamps are stored as BSON dates, so they round-trip at millisecond
/// precision; sub-millisecond digits are truncated on write.
///
/// Driver errors are returned unchanged inside [`RecallError::Backend`]; the
/// backend never retries. Searches with a `limit` above 10 000 fail with
/// [`RecallError::InvalidArgument`] before reaching the server.
pub struct MongoBackend {
    database: Database,
    config: MongoBackendConfig,
}

impl MongoBackend {
    /// Wrap an existing client.
    pub fn new(client: Client, config: MongoBackendConfig) -> Self {
        Self {
            database: client.database(&config.database),
            config,
        }
    }

    /// Parse `uri` and build a client. No round trip is made until the first
    /// operation.
    pub async fn from_uri(uri: &str, config: MongoBackendConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(RecallError::backend)?;
        options.app_name = Some(config.app_name.clone());

        let client = Client::with_options(options).map_err(RecallError::backend)?;
        tracing::debug!(database = %config.database, index = %config.index_name, "created mongodb backend");
        Ok(Self::new(client, config))
    }

    pub fn config(&self) -> &MongoBackendConfig {
        &self.config
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let names = self
            .database
            .list_collection_names()
            .filter(doc! { "name": name })
            .await
            .map_err(RecallError::backend)?;
        Ok(names.iter().any(|n| n == name))
    }
}

#[async_trait]
impl VectorBackend for MongoBackend {
    async fn create_collection(&self, name: &str) -> Result<()> {
        if self.exists(name).await? {
            return Ok(());
        }
        self.database
            .create_collection(name)
            .await
            .map_err(RecallError::backend)?;
        tracing::debug!(collection = name, "created mongodb collection");
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        self.exists(name).await
    }

    fn list_collections(&self) -> RecordStream<'_, String> {
        Box::pin(async_stream::stream! {
            match self.database.list_collection_names().await {
                Ok(names) => {
                    for name in names {
                        yield Ok(name);
                    }
                }
                Err(e) => yield Err(RecallError::backend(e)),
            }
        })
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        if !self.exists(name).await? {
            return Ok(());
        }
        self.collection(name)
            .drop()
            .await
            .map_err(RecallError::backend)?;
        tracing::debug!(collection = name, "dropped mongodb collection");
        Ok(())
    }

    async fn upsert_entry(&self, collection: &str, entry: StoredEntry) -> Result<String> {
        self.collection(collection)
            .update_one(key_filter(&entry.key), upsert_update(&self.config, &entry))
            .upsert(true)
            .await
            .map_err(RecallError::backend)?;
        Ok(entry.key)
    }

    async fn get_entry(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<StoredEntry>> {
        let found = self
            .collection(collection)
            .find_one(key_filter(key))
            .projection(projection(&self.config, with_embedding))
            .await
            .map_err(RecallError::backend)?;
        found
            .map(|doc| document_to_entry(&self.config, &doc, with_embedding))
            .transpose()
    }

    fn get_entries(
        &self,
        collection: &str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'_, StoredEntry> {
        let collection = self.collection(collection);
        Box::pin(async_stream::stream! {
            let cursor = collection
                .find(keys_filter(&keys))
                .projection(projection(&self.config, with_embedding))
                .await;
            let mut cursor = match cursor {
                Ok(cursor) => cursor,
                Err(e) => {
                    yield Err(RecallError::backend(e));
                    return;
                }
            };
            loop {
                match cursor.try_next().await {
                    Ok(Some(doc)) => yield document_to_entry(&self.config, &doc, with_embedding),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(RecallError::backend(e));
                        return;
                    }
                }
            }
        })
    }

    async fn delete_entry(&self, collection: &str, key: &str) -> Result<()> {
        self.collection(collection)
            .delete_one(key_filter(key))
            .await
            .map_err(RecallError::backend)?;
        Ok(())
    }

    async fn delete_entries(&self, collection: &str, keys: &[String]) -> Result<()> {
        let result = self
            .collection(collection)
            .delete_many(keys_filter(keys))
            .await
            .map_err(RecallError::backend)?;
        tracing::debug!(
            collection,
            requested = keys.len(),
            deleted = result.deleted_count,
            "mongodb batch delete"
        );
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
        let collection = self.collection(collection);
        Box::pin(async_stream::stream! {
            if limit == 0 {
                return;
            }
            if let Err(e) = check_limit(limit) {
                yield Err(e);
                return;
            }
            let pipeline = search_pipeline(&self.config, &query, limit, min_score, with_embedding);
            tracing::debug!(
                collection = collection.name(),
                limit,
                min_score,
                "running $vectorSearch"
            );
            let mut cursor = match collection.aggregate(pipeline).await {
                Ok(cursor) => cursor,
                Err(e) => {
                    yield Err(RecallError::backend(e));
                    return;
                }
            };
            loop {
                match cursor.try_next().await {
                    Ok(Some(doc)) => yield document_to_scored(&self.config, &doc, with_embedding),
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(RecallError::backend(e));
                        return;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_uri_builds_without_connecting() {
        let config = MongoBackendConfig::new("memory").with_app_name("recall-tests");
        let backend = MongoBackend::from_uri("mongodb://localhost:27017", config)
            .await
            .unwrap();
        assert_eq!(backend.config().database, "memory");
        assert_eq!(backend.config().app_name, "recall-tests");
    }

    #[tokio::test]
    async fn oversized_limit_is_rejected_before_the_server() {
        let config = MongoBackendConfig::new("db");
        let backend = MongoBackend::from_uri("mongodb://localhost:27017", config)
            .await
            .unwrap();
        let first = backend
            .nearest_entries("c", vec![1.0], 10_001, 0.0, false)
            .try_next()
            .await;
        assert!(first.unwrap_err().is_invalid_argument());
    }

    #[tokio::test]
    async fn from_uri_passes_driver_error_through() {
        let err = MongoBackend::from_uri("not-a-uri", MongoBackendConfig::new("db"))
            .await
            .err()
            .unwrap();
        let RecallError::Backend(inner) = err else {
            panic!("expected backend error");
        };
        assert!(inner.downcast_ref::<mongodb::error::Error>().is_some());
    }
}

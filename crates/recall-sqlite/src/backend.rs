use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recall_core::{
    rank_entries, RecallError, RecordStream, Result, ScoredEntry, StoredEntry, VectorBackend,
};
use rusqlite::{Connection, OptionalExtension};

/// Configuration for [`SqliteBackend`].
#[derive(Debug, Clone)]
pub struct SqliteBackendConfig {
    /// Path to the SQLite database file. Use `":memory:"` for an in-memory database.
    pub path: String,
}

impl SqliteBackendConfig {
    /// Create a new configuration with a file path.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Create a configuration for an in-memory SQLite database.
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
        }
    }
}

/// SQLite-backed implementation of the [`VectorBackend`] trait.
///
/// Collections are rows in `recall_collections`; entries live in
/// `recall_entries` keyed by `(collection, key)`. Embeddings are stored as
/// BLOBs (little-endian f32 sequences) and ranked by cosine similarity in
/// Rust. All SQLite work runs on the blocking thread pool.
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open (or create) the database and initialize the tables.
    pub fn new(config: SqliteBackendConfig) -> Result<Self> {
        let conn = Connection::open(&config.path).map_err(RecallError::backend)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recall_collections (
                name TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS recall_entries (
                collection TEXT NOT NULL,
                key        TEXT NOT NULL,
                metadata   TEXT NOT NULL,
                embedding  BLOB NOT NULL,
                timestamp  TEXT,
                PRIMARY KEY (collection, key)
            );",
        )
        .map_err(RecallError::backend)?;

        tracing::debug!(path = %config.path, "opened sqlite vector backend");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| RecallError::backend(format!("lock error: {e}")))?;
            f(&conn)
        })
        .await
        .map_err(RecallError::backend)?
    }
}

fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM recall_collections WHERE name = ?1",
        rusqlite::params![name],
        |_| Ok(()),
    )
    .optional()
    .map(|row| row.is_some())
    .map_err(RecallError::backend)
}

fn select_sql(with_embedding: bool) -> &'static str {
    if with_embedding {
        "SELECT key, metadata, timestamp, embedding FROM recall_entries
         WHERE collection = ?1 AND key = ?2"
    } else {
        "SELECT key, metadata, timestamp FROM recall_entries
         WHERE collection = ?1 AND key = ?2"
    }
}

type RawRow = (String, String, Option<String>, Option<Vec<u8>>);

fn read_row(row: &rusqlite::Row<'_>, with_embedding: bool) -> rusqlite::Result<RawRow> {
    let blob = if with_embedding {
        Some(row.get::<_, Vec<u8>>(3)?)
    } else {
        None
    };
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, blob))
}

fn raw_to_entry((key, metadata, timestamp, blob): RawRow) -> Result<StoredEntry> {
    Ok(StoredEntry {
        key,
        metadata,
        embedding: blob.map(|b| blob_to_embed(&b)),
        timestamp: timestamp.as_deref().map(parse_timestamp).transpose()?,
    })
}

fn get_one(
    conn: &Connection,
    collection: &str,
    key: &str,
    with_embedding: bool,
) -> Result<Option<StoredEntry>> {
    conn.query_row(
        select_sql(with_embedding),
        rusqlite::params![collection, key],
        |row| read_row(row, with_embedding),
    )
    .optional()
    .map_err(RecallError::backend)?
    .map(raw_to_entry)
    .transpose()
}

#[async_trait]
impl VectorBackend for SqliteBackend {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            if collection_exists(conn, &name)? {
                return Ok(());
            }
            conn.execute(
                "INSERT INTO recall_collections (name) VALUES (?1)",
                rusqlite::params![name],
            )
            .map_err(RecallError::backend)?;
            tracing::debug!(collection = %name, "created sqlite collection");
            Ok(())
        })
        .await
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let name = name.to_string();
        self.with_conn(move |conn| collection_exists(conn, &name))
            .await
    }

    fn list_collections(&self) -> RecordStream<'_, String> {
        Box::pin(async_stream::stream! {
            let names = self
                .with_conn(|conn| {
                    let mut stmt = conn
                        .prepare("SELECT name FROM recall_collections ORDER BY name")
                        .map_err(RecallError::backend)?;
                    let names = stmt
                        .query_map([], |row| row.get::<_, String>(0))
                        .map_err(RecallError::backend)?
                        .collect::<rusqlite::Result<Vec<String>>>()
                        .map_err(RecallError::backend)?;
                    Ok(names)
                })
                .await;
            match names {
                Ok(names) => {
                    for name in names {
                        yield Ok(name);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }

    async fn drop_collection(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            if !collection_exists(conn, &name)? {
                return Ok(());
            }
            conn.execute(
                "DELETE FROM recall_entries WHERE collection = ?1",
                rusqlite::params![name],
            )
            .map_err(RecallError::backend)?;
            conn.execute(
                "DELETE FROM recall_collections WHERE name = ?1",
                rusqlite::params![name],
            )
            .map_err(RecallError::backend)?;
            tracing::debug!(collection = %name, "dropped sqlite collection");
            Ok(())
        })
        .await
    }

    async fn upsert_entry(&self, collection: &str, entry: StoredEntry) -> Result<String> {
        let collection = collection.to_string();
        self.with_conn(move |conn| {
            if !collection_exists(conn, &collection)? {
                return Err(RecallError::CollectionNotFound(collection));
            }
            let blob = embed_to_blob(entry.embedding.as_deref().unwrap_or_default());
            let timestamp = entry.timestamp.map(|t| t.to_rfc3339());

            conn.execute(
                "INSERT INTO recall_entries (collection, key, metadata, embedding, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (collection, key) DO UPDATE SET
                    metadata = excluded.metadata,
                    embedding = excluded.embedding,
                    timestamp = excluded.timestamp",
                rusqlite::params![collection, entry.key, entry.metadata, blob, timestamp],
            )
            .map_err(RecallError::backend)?;
            Ok(entry.key)
        })
        .await
    }

    async fn get_entry(
        &self,
        collection: &str,
        key: &str,
        with_embedding: bool,
    ) -> Result<Option<StoredEntry>> {
        let collection = collection.to_string();
        let key = key.to_string();
        self.with_conn(move |conn| get_one(conn, &collection, &key, with_embedding))
            .await
    }

    fn get_entries(
        &self,
        collection: &str,
        keys: Vec<String>,
        with_embedding: bool,
    ) -> RecordStream<'_, StoredEntry> {
        let collection = collection.to_string();
        Box::pin(async_stream::stream! {
            let requested = keys.len();
            let found = self
                .with_conn(move |conn| {
                    let mut found = Vec::with_capacity(keys.len());
                    for key in &keys {
                        if let Some(entry) = get_one(conn, &collection, key, with_embedding)? {
                            found.push(entry);
                        }
                    }
                    Ok(found)
                })
                .await;
            match found {
                Ok(found) => {
                    tracing::debug!(requested, found = found.len(), "sqlite batch get");
                    for entry in found {
                        yield Ok(entry);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }

    async fn delete_entry(&self, collection: &str, key: &str) -> Result<()> {
        let collection = collection.to_string();
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM recall_entries WHERE collection = ?1 AND key = ?2",
                rusqlite::params![collection, key],
            )
            .map_err(RecallError::backend)?;
            Ok(())
        })
        .await
    }

    async fn delete_entries(&self, collection: &str, keys: &[String]) -> Result<()> {
        let collection = collection.to_string();
        let keys = keys.to_vec();
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare("DELETE FROM recall_entries WHERE collection = ?1 AND key = ?2")
                .map_err(RecallError::backend)?;
            for key in &keys {
                stmt.execute(rusqlite::params![collection, key])
                    .map_err(RecallError::backend)?;
            }
            Ok(())
        })
        .await
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
            if limit == 0 {
                return;
            }
            let ranked = self
                .with_conn(move |conn| {
                    let mut stmt = conn
                        .prepare(
                            "SELECT key, metadata, timestamp, embedding FROM recall_entries
                             WHERE collection = ?1",
                        )
                        .map_err(RecallError::backend)?;
                    let candidates = stmt
                        .query_map(rusqlite::params![collection], |row| read_row(row, true))
                        .map_err(RecallError::backend)?
                        .collect::<rusqlite::Result<Vec<RawRow>>>()
                        .map_err(RecallError::backend)?
                        .into_iter()
                        .map(raw_to_entry)
                        .collect::<Result<Vec<StoredEntry>>>()?;
                    Ok(rank_entries(&query, candidates, limit, min_score))
                })
                .await;
            match ranked {
                Ok(ranked) => {
                    for mut scored in ranked {
                        if !with_embedding {
                            scored.entry.embedding = None;
                        }
                        yield Ok(scored);
                    }
                }
                Err(e) => yield Err(e),
            }
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RecallError::Serialization(format!("invalid timestamp '{raw}': {e}")))
}

/// Serialize an embedding vector to a little-endian byte blob.
fn embed_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a little-endian byte blob to an embedding vector.
fn blob_to_embed(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

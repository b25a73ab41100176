//! BSON shapes exchanged with MongoDB: projections, the upsert update, the
//! `$vectorSearch` pipeline, and decoding of returned documents.

use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use recall_core::{RecallError, Result, ScoredEntry, StoredEntry};

use crate::config::MongoBackendConfig;

pub(crate) const ID_FIELD: &str = "_id";
pub(crate) const METADATA_FIELD: &str = "metadata";
pub(crate) const TIMESTAMP_FIELD: &str = "timestamp";
pub(crate) const SCORE_FIELD: &str = "score";

/// Fields returned by reads. The embedding is included only on request.
pub(crate) fn projection(config: &MongoBackendConfig, with_embedding: bool) -> Document {
    let mut projection = doc! {
        ID_FIELD: 1,
        METADATA_FIELD: 1,
        TIMESTAMP_FIELD: 1,
    };
    if with_embedding {
        projection.insert(config.embedding_path.as_str(), 1);
    }
    projection
}

pub(crate) fn key_filter(key: &str) -> Document {
    doc! { ID_FIELD: key }
}

pub(crate) fn keys_filter(keys: &[String]) -> Document {
    doc! { ID_FIELD: { "$in": keys } }
}

/// `$set` of every stored field. Fields are always written together so a
/// later upsert fully replaces an earlier one.
/// The timestamp is truncated to milliseconds.
pub(crate) fn upsert_update(config: &MongoBackendConfig, entry: &StoredEntry) -> Document {
    let embedding = entry
        .embedding
        .as_deref()
        .map(embedding_to_bson)
        .unwrap_or_else(|| Bson::Array(Vec::new()));
    let timestamp = entry
        .timestamp
        .map(|t| Bson::DateTime(bson::DateTime::from_millis(t.timestamp_millis())))
        .unwrap_or(Bson::Null);

    let mut fields = Document::new();
    fields.insert(METADATA_FIELD, entry.metadata.as_str());
    fields.insert(config.embedding_path.as_str(), embedding);
    fields.insert(TIMESTAMP_FIELD, timestamp);
    doc! { "$set": fields }
}

/// `$vectorSearch` → `$project` (with the relevance score) → `$match` on
/// the minimum score.
pub(crate) fn search_pipeline(
    config: &MongoBackendConfig,
    query: &[f32],
    limit: usize,
    min_score: f64,
    with_embedding: bool,
) -> Vec<Document> {
    let mut project = projection(config, with_embedding);
    project.insert(SCORE_FIELD, doc! { "$meta": "vectorSearchScore" });

    vec![
        doc! {
            "$vectorSearch": {
                "index": config.index_name.as_str(),
                "path": config.embedding_path.as_str(),
                "queryVector": embedding_to_bson(query),
                "numCandidates": config.num_candidates(limit) as i64,
                "limit": limit as i64,
            }
        },
        doc! { "$project": project },
        doc! { "$match": { SCORE_FIELD: { "$gte": min_score } } },
    ]
}

fn embedding_to_bson(embedding: &[f32]) -> Bson {
    Bson::Array(embedding.iter().map(|v| Bson::Double(*v as f64)).collect())
}

fn bson_to_embedding(value: &Bson) -> Result<Vec<f32>> {
    let Bson::Array(items) = value else {
        return Err(RecallError::Serialization(format!(
            "embedding is not an array: {value}"
        )));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Double(v) => Ok(*v as f32),
            Bson::Int32(v) => Ok(*v as f32),
            Bson::Int64(v) => Ok(*v as f32),
            other => Err(RecallError::Serialization(format!(
                "embedding element is not numeric: {other}"
            ))),
        })
        .collect()
}

fn bson_to_timestamp(value: Option<&Bson>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::DateTime(dt)) => Ok(DateTime::from_timestamp_millis(dt.timestamp_millis())),
        Some(other) => Err(RecallError::Serialization(format!(
            "timestamp is not a datetime: {other}"
        ))),
    }
}

/// Decode a stored document. The embedding is read only if it was projected.
pub(crate) fn document_to_entry(
    config: &MongoBackendConfig,
    doc: &Document,
    with_embedding: bool,
) -> Result<StoredEntry> {
    let key = doc
        .get_str(ID_FIELD)
        .map_err(|e| RecallError::Serialization(format!("invalid {ID_FIELD}: {e}")))?
        .to_string();
    let metadata = doc
        .get_str(METADATA_FIELD)
        .map_err(|e| RecallError::Serialization(format!("invalid {METADATA_FIELD}: {e}")))?
        .to_string();
    let embedding = if with_embedding {
        Some(
            doc.get(config.embedding_path.as_str())
                .map(bson_to_embedding)
                .transpose()?
                .unwrap_or_default(),
        )
    } else {
        None
    };

    Ok(StoredEntry {
        key,
        metadata,
        embedding,
        timestamp: bson_to_timestamp(doc.get(TIMESTAMP_FIELD))?,
    })
}

/// Decode a `$vectorSearch` result carrying a `score` field.
pub(crate) fn document_to_scored(
    config: &MongoBackendConfig,
    doc: &Document,
    with_embedding: bool,
) -> Result<ScoredEntry> {
    let score = doc
        .get_f64(SCORE_FIELD)
        .map_err(|e| RecallError::Serialization(format!("invalid {SCORE_FIELD}: {e}")))?;
    Ok(ScoredEntry {
        entry: document_to_entry(config, doc, with_embedding)?,
        score,
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecallError, Result};

/// Metadata attached to every [`MemoryRecord`].
///
/// Stored by backends as an opaque JSON string; see [`to_json`](Self::to_json).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryRecordMetadata {
    /// `true` when the record points at an external source instead of
    /// holding locally authored text.
    pub is_reference: bool,
    /// Name of the external source. Empty for local records.
    #[serde(default)]
    pub external_source_name: String,
    /// Unique identifier; doubles as the record key.
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub text: String,
    /// Free-form payload owned by the caller.
    #[serde(default)]
    pub additional_metadata: String,
}

impl MemoryRecordMetadata {
    /// Encode as the JSON string persisted by backends.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(RecallError::from)
    }

    /// Decode the JSON string persisted by backends.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(RecallError::from)
    }
}

/// A record in a vector memory collection.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    key: String,
    pub metadata: MemoryRecordMetadata,
    /// Empty unless the embedding was written or explicitly requested on read.
    pub embedding: Vec<f32>,
    /// Assigned by the store on upsert when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    /// Build a record whose key is taken from `metadata.id`.
    pub fn new(
        metadata: MemoryRecordMetadata,
        embedding: Vec<f32>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            key: metadata.id.clone(),
            metadata,
            embedding,
            timestamp,
        }
    }

    /// Build a record holding locally authored text.
    pub fn local_record(
        id: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
        embedding: Vec<f32>,
        additional_metadata: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self::new(
            MemoryRecordMetadata {
                is_reference: false,
                external_source_name: String::new(),
                id: id.into(),
                description: description.into(),
                text: text.into(),
                additional_metadata: additional_metadata.into(),
            },
            embedding,
            timestamp,
        )
    }

    /// Build a record that references content held by an external source.
    pub fn reference_record(
        external_id: impl Into<String>,
        source_name: impl Into<String>,
        description: impl Into<String>,
        embedding: Vec<f32>,
        additional_metadata: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self::new(
            MemoryRecordMetadata {
                is_reference: true,
                external_source_name: source_name.into(),
                id: external_id.into(),
                description: description.into(),
                text: String::new(),
                additional_metadata: additional_metadata.into(),
            },
            embedding,
            timestamp,
        )
    }

    /// Rebuild a record from its stored form.
    ///
    /// `key` is the stored identifier; it wins over whatever `metadata.id`
    /// decodes to so a record always reports the key it was found under.
    pub fn from_json_metadata(
        json: &str,
        embedding: Option<Vec<f32>>,
        key: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let metadata = MemoryRecordMetadata::from_json(json)?;
        Ok(Self {
            key: key.into(),
            metadata,
            embedding: embedding.unwrap_or_default(),
            timestamp,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Drop the embedding, keeping everything else.
    pub fn without_embedding(mut self) -> Self {
        self.embedding = Vec::new();
        self
    }
}

//! Core traits and types for Recall.
//!
//! - [`MemoryRecord`] / [`MemoryRecordMetadata`]: the domain record.
//! - [`MemoryStore`]: the contract the host framework consumes.
//! - [`VectorBackend`]: the driver adapter each storage backend implements.
//! - [`RecallError`]: the shared error type.

mod backend;
mod error;
mod record;
mod store;

use std::pin::Pin;

use futures::Stream;

pub use backend::{cosine_similarity, rank_entries, ScoredEntry, StoredEntry, VectorBackend};
pub use error::{BoxError, RecallError, Result};
pub use record::{MemoryRecord, MemoryRecordMetadata};
pub use store::{validate_collection_name, validate_key, MemoryStore};

/// A lazy, single-pass stream of results. Dropping it cancels any
/// in-flight backend round trip.
pub type RecordStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

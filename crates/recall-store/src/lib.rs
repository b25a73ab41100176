//! Record store for Recall.
//!
//! [`RecordStore`] implements the [`MemoryStore`] contract on top of any
//! [`VectorBackend`]. [`InMemoryBackend`] is a dependency-free backend for
//! tests and ephemeral use.

mod in_memory;
mod record_store;

pub use in_memory::InMemoryBackend;
pub use record_store::RecordStore;

// Re-export core types for convenience.
pub use recall_core::{MemoryRecord, MemoryRecordMetadata, MemoryStore, RecallError, VectorBackend};

//! Recall: a vector-record memory store with pluggable backends.
//!
//! This crate re-exports the Recall sub-crates and opens a [`RecordStore`]
//! from a [`RecallConfig`].
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `sqlite` |
//! | `sqlite` | Embedded SQLite backend |
//! | `mongodb` | MongoDB Atlas Vector Search backend |
//! | `full` | All backends |
//!
//! The in-memory backend is always available.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use recall::{open_store, MemoryRecord, MemoryStore, RecallConfig};
//!
//! let config = RecallConfig::load(None)?;
//! recall::init_tracing(&config.logging)?;
//! let store = open_store(&config).await?;
//! store.create_collection("notes").await?;
//! store
//!     .upsert("notes", MemoryRecord::local_record("n1", "hello", "", vec![0.1, 0.2], "", None))
//!     .await?;
//! ```

mod logging;
mod open;

/// Records, the `MemoryStore` and `VectorBackend` traits, and `RecallError`.
pub use recall_core as core;

/// `RecordStore` and the in-memory backend.
pub use recall_store as store;

/// Configuration loading.
pub use recall_config as config;

/// Embedded SQLite backend.
#[cfg(feature = "sqlite")]
pub use recall_sqlite as sqlite;

/// MongoDB Atlas Vector Search backend.
#[cfg(feature = "mongodb")]
pub use recall_mongodb as mongodb;

pub use logging::{env_filter, init_tracing};
pub use open::open_store;

pub use recall_config::{BackendConfig, LoggingConfig, RecallConfig};
pub use recall_core::{
    MemoryRecord, MemoryRecordMetadata, MemoryStore, RecallError, RecordStream, Result,
    VectorBackend,
};
pub use recall_store::{InMemoryBackend, RecordStore};

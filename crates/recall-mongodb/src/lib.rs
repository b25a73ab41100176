//! MongoDB Atlas Vector Search backend for Recall.
//!
//! This crate provides [`MongoBackend`], an implementation of the
//! [`VectorBackend`](recall_core::VectorBackend) trait backed by
//! [MongoDB Atlas Vector Search](https://www.mongodb.com/docs/atlas/atlas-vector-search/).
//!
//! The vector index is provisioned outside Recall. A minimal index definition
//! for 1536-dimensional embeddings:
//!
//! ```json
//! {
//!   "fields": [
//!     { "type": "vector", "path": "embedding", "numDimensions": 1536, "similarity": "cosine" }
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use recall_mongodb::{MongoBackend, MongoBackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MongoBackendConfig::new("my_database").with_index_name("vector_index");
//! let backend = MongoBackend::from_uri("mongodb+srv://...", config).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod documents;

pub use backend::MongoBackend;
pub use config::MongoBackendConfig;

// Re-export core traits for convenience.
pub use recall_core::{MemoryRecord, VectorBackend};

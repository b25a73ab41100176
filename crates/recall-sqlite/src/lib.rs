//! SQLite backend for Recall.
//!
//! [`SqliteBackend`] implements [`VectorBackend`] on a single SQLite database,
//! file-based or in-memory. Similarity is computed in process, so it suits
//! local development and small collections.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use recall_sqlite::{SqliteBackend, SqliteBackendConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // In-memory database (great for testing)
//! let backend = SqliteBackend::new(SqliteBackendConfig::in_memory())?;
//!
//! // File-based database
//! let backend = SqliteBackend::new(SqliteBackendConfig::new("/tmp/recall.db"))?;
//! # Ok(())
//! # }
//! ```

mod backend;

pub use backend::{SqliteBackend, SqliteBackendConfig};

// Re-export core traits for convenience.
pub use recall_core::VectorBackend;

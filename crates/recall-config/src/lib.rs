//! Configuration for Recall: which backend to open and how to log.
//!
//! ```toml
//! [backend]
//! kind = "mongodb"
//! connection_string_env = "MONGODB_URI"
//! database = "memory"
//!
//! [logging]
//! filter = "recall=info"
//! ```

mod backend;
mod format;
mod source;

pub use backend::{BackendConfig, MongoSettings, SqliteSettings};
pub use format::{parse_config, ConfigFormat};
pub use source::{
    default_locations, discover_and_load, load_from_source, locate, ConfigSource,
    FileConfigSource, CONFIG_ENV,
};

use std::path::Path;

use recall_core::RecallError;
use serde::Deserialize;

/// Top-level configuration, loaded from TOML / JSON / YAML.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct RecallConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `tracing` subscriber settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` is used when unset.
    pub filter: Option<String>,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl RecallConfig {
    /// Load configuration from a file.
    ///
    /// Search order:
    /// 1. Explicit path (if provided)
    /// 2. `$RECALL_CONFIG`
    /// 3. `./recall.{toml,json,yaml,yml}`
    /// 4. `~/.recall/config.{toml,json,yaml,yml}`
    pub fn load(path: Option<&Path>) -> Result<Self, RecallError> {
        discover_and_load(path)
    }

    pub fn load_from(source: &dyn ConfigSource) -> Result<Self, RecallError> {
        load_from_source(source)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, RecallError> {
        parse_config(content, format)
    }
}

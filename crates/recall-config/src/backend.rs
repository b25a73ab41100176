use recall_core::RecallError;
use serde::Deserialize;

/// Which storage backend to open, tagged by `kind`.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    Mongodb(MongoSettings),
    Sqlite(SqliteSettings),
    #[default]
    Memory,
}

impl BackendConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mongodb(_) => "mongodb",
            Self::Sqlite(_) => "sqlite",
            Self::Memory => "memory",
        }
    }
}

/// MongoDB Atlas connection and vector search settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MongoSettings {
    /// Literal connection string. Takes precedence over `connection_string_env`.
    pub connection_string: Option<String>,
    /// Environment variable holding the connection string.
    #[serde(default = "default_connection_string_env")]
    pub connection_string_env: String,
    pub database: String,
    #[serde(default = "default_index_name")]
    pub index_name: String,
    #[serde(default = "default_embedding_path")]
    pub embedding_path: String,
    #[serde(default = "default_num_candidates_multiplier")]
    pub num_candidates_multiplier: usize,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl MongoSettings {
    /// The literal connection string if set, otherwise the value of
    /// `connection_string_env`.
    pub fn resolve_connection_string(&self) -> Result<String, RecallError> {
        if let Some(uri) = &self.connection_string {
            return Ok(uri.clone());
        }
        std::env::var(&self.connection_string_env).map_err(|_| {
            RecallError::Config(format!(
                "environment variable '{}' not set",
                self.connection_string_env
            ))
        })
    }
}

fn default_connection_string_env() -> String {
    "MONGODB_URI".to_string()
}

fn default_index_name() -> String {
    "default".to_string()
}

fn default_embedding_path() -> String {
    "embedding".to_string()
}

fn default_num_candidates_multiplier() -> usize {
    10
}

fn default_app_name() -> String {
    "recall".to_string()
}

/// SQLite database location. `":memory:"` opens a private in-memory database.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SqliteSettings {
    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> String {
    "recall.db".to_string()
}

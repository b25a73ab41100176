use recall_config::{BackendConfig, RecallConfig};
use recall_core::{RecallError, Result};
use recall_store::{InMemoryBackend, RecordStore};

/// Open a [`RecordStore`] over the backend selected by `config.backend`.
///
/// MongoDB clients connect lazily, so this succeeds without a reachable
/// server as long as the connection string parses.
pub async fn open_store(config: &RecallConfig) -> Result<RecordStore> {
    tracing::debug!(backend = config.backend.kind(), "opening record store");
    match &config.backend {
        BackendConfig::Memory => Ok(RecordStore::from_backend(InMemoryBackend::new())),
        #[cfg(feature = "sqlite")]
        BackendConfig::Sqlite(settings) => {
            let backend = recall_sqlite::SqliteBackend::new(
                recall_sqlite::SqliteBackendConfig::new(settings.path.clone()),
            )?;
            Ok(RecordStore::from_backend(backend))
        }
        #[cfg(feature = "mongodb")]
        BackendConfig::Mongodb(settings) => {
            let uri = settings.resolve_connection_string()?;
            let backend_config = recall_mongodb::MongoBackendConfig::new(settings.database.clone())
                .with_index_name(settings.index_name.clone())
                .with_embedding_path(settings.embedding_path.clone())
                .with_num_candidates_multiplier(settings.num_candidates_multiplier)
                .with_app_name(settings.app_name.clone());
            let backend = recall_mongodb::MongoBackend::from_uri(&uri, backend_config).await?;
            Ok(RecordStore::from_backend(backend))
        }
        #[allow(unreachable_patterns)]
        other => Err(RecallError::Config(format!(
            "backend '{kind}' requires the `{kind}` feature",
            kind = other.kind()
        ))),
    }
}

use recall_core::{RecallError, Result};

/// Upper bound Atlas accepts for `numCandidates`, and therefore for `limit`.
pub(crate) const MAX_NUM_CANDIDATES: usize = 10_000;

/// Configuration for [`MongoBackend`](crate::MongoBackend).
///
/// The Atlas Vector Search index named by `index_name` must already exist on
/// every collection that is searched, indexing `embedding_path` with the
/// dimensionality and similarity metric of the stored embeddings.
#[derive(Debug, Clone)]
pub struct MongoBackendConfig {
    /// Database holding the memory collections.
    pub database: String,
    /// Name of the Atlas Vector Search index. Defaults to `"default"`.
    pub index_name: String,
    /// Document field holding the embedding. Defaults to `"embedding"`.
    pub embedding_path: String,
    /// `numCandidates` is `limit * num_candidates_multiplier`. Defaults to `10`.
    pub num_candidates_multiplier: usize,
    /// Application name reported to the server. Defaults to `"recall"`.
    pub app_name: String,
}

impl MongoBackendConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            index_name: "default".to_string(),
            embedding_path: "embedding".to_string(),
            num_candidates_multiplier: 10,
            app_name: "recall".to_string(),
        }
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_embedding_path(mut self, path: impl Into<String>) -> Self {
        self.embedding_path = path.into();
        self
    }

    pub fn with_num_candidates_multiplier(mut self, multiplier: usize) -> Self {
        self.num_candidates_multiplier = multiplier.max(1);
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Candidate pool size for a search returning `limit` results:
    /// `limit * num_candidates_multiplier`, capped at 10 000. Never exceeds
    /// the cap; limits above it are rejected by [`check_limit`].
    pub fn num_candidates(&self, limit: usize) -> usize {
        limit
            .saturating_mul(self.num_candidates_multiplier)
            .min(MAX_NUM_CANDIDATES)
    }
}

/// `$vectorSearch` requires `limit <= numCandidates <= 10 000`.
pub(crate) fn check_limit(limit: usize) -> Result<()> {
    if limit > MAX_NUM_CANDIDATES {
        return Err(RecallError::InvalidArgument(format!(
            "search limit {limit} exceeds the Atlas maximum of {MAX_NUM_CANDIDATES}"
        )));
    }
    Ok(())
}

/// Boxed error type used to carry a backend driver's error unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors produced by Recall stores and backends.
#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    /// A required argument (collection name, key) was empty or blank.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A write targeted a collection that has not been created.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Record metadata could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded, parsed or resolved.
    #[error("config error: {0}")]
    Config(String),

    /// A fault raised by the backend driver, passed through as-is.
    #[error(transparent)]
    Backend(BoxError),
}

impl RecallError {
    /// Wrap a backend driver error without altering it.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Backend(err.into())
    }

    /// Returns `true` for [`RecallError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for RecallError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias used throughout Recall.
pub type Result<T> = std::result::Result<T, RecallError>;

use recall_config::LoggingConfig;
use recall_core::{RecallError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Build the filter for `config`: its `filter` directives if set, otherwise
/// `RUST_LOG`, otherwise `info`.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match &config.filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| RecallError::Config(format!("invalid log filter '{directives}': {e}"))),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install the global `tracing` subscriber. Fails if one is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config)?);
    let installed = if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .flatten_event(true),
            )
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| RecallError::Config(format!("failed to install subscriber: {e}")))
}

use std::path::{Path, PathBuf};

use recall_core::RecallError;
use serde::de::DeserializeOwned;

use crate::format::{parse_config, ConfigFormat};

/// Environment variable naming a config file; consulted before the default
/// locations.
pub const CONFIG_ENV: &str = "RECALL_CONFIG";

const EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// Somewhere a configuration document can be fetched from.
pub trait ConfigSource: Send + Sync {
    /// Return the raw document and the format it is written in.
    fn fetch(&self) -> Result<(String, ConfigFormat), RecallError>;
}

/// A configuration file whose format is fixed by its extension.
///
/// [`open`](Self::open) checks the extension up front, so an unsupported
/// file is reported before anything is read.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
    format: ConfigFormat,
}

impl FileConfigSource {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RecallError> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path).ok_or_else(|| {
            RecallError::Config(format!(
                "unsupported config extension (expected .toml, .json, .yaml or .yml): {}",
                path.display()
            ))
        })?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }
}

impl ConfigSource for FileConfigSource {
    fn fetch(&self) -> Result<(String, ConfigFormat), RecallError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            RecallError::Config(format!("failed to read {}: {e}", self.path.display()))
        })?;
        Ok((content, self.format))
    }
}

pub fn load_from_source<T: DeserializeOwned>(source: &dyn ConfigSource) -> Result<T, RecallError> {
    let (content, format) = source.fetch()?;
    parse_config(&content, format)
}

/// Candidate locations searched when neither an explicit path nor
/// `RECALL_CONFIG` is given, in order.
pub fn default_locations() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("./recall.{ext}")))
        .collect();
    if let Some(home) = dirs::home_dir() {
        paths.extend(
            EXTENSIONS
                .iter()
                .map(|ext| home.join(".recall").join(format!("config.{ext}"))),
        );
    }
    paths
}

/// Pick the configuration file to load.
///
/// 1. `path`, when given.
/// 2. The file named by `RECALL_CONFIG`, when set and non-empty.
/// 3. The first of [`default_locations`] that exists.
///
/// A file named explicitly (by argument or environment) must exist; it never
/// falls through to the defaults.
pub fn locate(path: Option<&Path>) -> Result<PathBuf, RecallError> {
    let named = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from));

    if let Some(p) = named {
        if !p.exists() {
            return Err(RecallError::Config(format!(
                "config file not found: {}",
                p.display()
            )));
        }
        return Ok(p);
    }

    default_locations()
        .into_iter()
        .find(|c| c.exists())
        .ok_or_else(|| {
            RecallError::Config(
                "no config file found: set RECALL_CONFIG or create ./recall.{toml,json,yaml,yml} or ~/.recall/config.{toml,json,yaml,yml}"
                    .to_string(),
            )
        })
}

/// [`locate`] a configuration file and load it as `T`.
pub fn discover_and_load<T: DeserializeOwned>(path: Option<&Path>) -> Result<T, RecallError> {
    let source = FileConfigSource::open(locate(path)?)?;
    load_from_source(&source)
}

use std::path::Path;

use recall_core::RecallError;
use serde::de::DeserializeOwned;

/// File formats a configuration can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Map an extension (`toml`, `json`, `yaml`, `yml`, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Deserialize `content` as `format`. Parse failures become
/// [`RecallError::Config`].
pub fn parse_config<T: DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
) -> Result<T, RecallError> {
    let parsed = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| RecallError::Config(format!("{} parse error: {e}", format.name())))
}

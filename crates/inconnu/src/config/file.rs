//! File-based configuration loading.

use std::path::Path;

use tracing::debug;

use super::Config;
use crate::error::{InconnuError, Result};

/// Configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Detect format from path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Parse configuration text. Missing keys take their default values.
///
/// # Errors
///
/// Returns a TOML or JSON error if the content does not parse.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config> {
    let config = match format {
        ConfigFormat::Toml => toml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    Ok(config)
}

/// Load and validate a configuration file, picking the format from its
/// extension.
///
/// # Errors
///
/// Returns an error if the extension is not recognized, the file cannot be
/// read or parsed, or the settings are inconsistent.
pub fn load_config(path: &Path) -> Result<Config> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        InconnuError::config(format!(
            "unsupported config file extension: {}",
            path.display()
        ))
    })?;
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content, format)?;
    config.validate()?;

    debug!(path = %path.display(), ?format, "Loaded configuration");
    Ok(config)
}

//! Environment-based configuration.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use super::Config;
use crate::error::{InconnuError, Result};
use crate::patterns::PatternDomain;

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "INCONNU";

/// Recognized variable names, without the prefix.
pub mod vars {
    /// Maximum input length in characters.
    pub const MAX_TEXT_LENGTH: &str = "MAX_TEXT_LENGTH";
    /// Stream window size.
    pub const CHUNK_SIZE: &str = "CHUNK_SIZE";
    /// Stream window overlap.
    pub const CHUNK_OVERLAP: &str = "CHUNK_OVERLAP";
    /// Batch group size.
    pub const BATCH_SIZE: &str = "BATCH_SIZE";
    /// Provider cache key.
    pub const LANGUAGE: &str = "LANGUAGE";
    /// Keep input text in results.
    pub const STORE_ORIGINAL: &str = "STORE_ORIGINAL";
    /// Comma-separated pattern domains.
    pub const DOMAINS: &str = "DOMAINS";
}

/// Environment variable reader.
///
/// Reads the process environment unless a fixed source was supplied with
/// [`EnvConfig::with_source`].
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Fixed variables used instead of the process environment.
    source: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: None,
        }
    }

    /// Read from a fixed set of variables instead of the process
    /// environment. Keys are full variable names, prefix included.
    #[must_use]
    pub fn with_source<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.source = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.source {
            Some(source) => source.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get a parsed value.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the variable if it is set but does not
    /// parse.
    pub fn parse<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(name)
            .map(|raw| {
                raw.trim().parse().map_err(|e| {
                    InconnuError::config(format!("{}={raw:?}: {e}", self.var_name(name)))
                })
            })
            .transpose()
    }

    /// Get a boolean value.
    ///
    /// # Errors
    ///
    /// Returns a config error for values that are not a recognized boolean.
    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
            .map(|raw| match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" | "enabled" => Ok(true),
                "0" | "false" | "no" | "off" | "disabled" => Ok(false),
                _ => Err(InconnuError::config(format!(
                    "{}={raw:?}: expected a boolean",
                    self.var_name(name)
                ))),
            })
            .transpose()
    }

    /// Overlay the variables that are set onto `config`.
    ///
    /// # Errors
    ///
    /// Returns a config error if a variable is malformed. The result is not
    /// validated; call [`Config::validate`] afterwards.
    pub fn apply(&self, mut config: Config) -> Result<Config> {
        if let Some(v) = self.parse(vars::MAX_TEXT_LENGTH)? {
            config.max_text_length = v;
        }
        if let Some(v) = self.parse(vars::CHUNK_SIZE)? {
            config.chunk_size = v;
        }
        if let Some(v) = self.parse(vars::CHUNK_OVERLAP)? {
            config.chunk_overlap = v;
        }
        if let Some(v) = self.parse(vars::BATCH_SIZE)? {
            config.batch_size = v;
        }
        if let Some(v) = self.get(vars::LANGUAGE) {
            config.language = v.trim().to_string();
        }
        if let Some(v) = self.bool(vars::STORE_ORIGINAL)? {
            config.store_original = v;
        }
        if let Some(raw) = self.get(vars::DOMAINS) {
            config.enabled_domains = raw
                .split(',')
                .filter(|d| !d.trim().is_empty())
                .map(PatternDomain::from_str)
                .collect::<Result<_>>()?;
        }

        debug!(prefix = %self.prefix, "Applied environment overrides");
        Ok(config)
    }
}

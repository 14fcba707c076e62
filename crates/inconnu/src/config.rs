//! Engine configuration.
//!
//! [`Config`] holds every setting the engine reads from its host. It can be
//! built in code, loaded from a TOML or JSON file ([`file`]), and overridden
//! from `INCONNU_*` environment variables ([`env`]). Missing keys fall back
//! to the defaults below.

pub mod env;
pub mod file;

use serde::{Deserialize, Serialize};

use crate::error::{InconnuError, Result};
use crate::label::EntityLabel;
use crate::patterns::PatternDomain;
use crate::redaction::DEFAULT_EXCLUDED_LABELS;

/// Default maximum input length in characters.
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 75_000;

/// Default stream window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Default overlap between stream windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default number of documents per batch group.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default provider cache key.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inputs longer than this many characters are rejected.
    pub max_text_length: usize,

    /// Window size for [`redact_stream`](crate::Inconnu::redact_stream).
    pub chunk_size: usize,

    /// Characters carried from one stream window into the next.
    pub chunk_overlap: usize,

    /// Documents per group in batch calls.
    pub batch_size: usize,

    /// Pattern domains switched on.
    pub enabled_domains: Vec<PatternDomain>,

    /// Labels never redacted.
    pub excluded_labels: Vec<EntityLabel>,

    /// Keep the input text in [`ProcessedResult`](crate::ProcessedResult).
    pub store_original: bool,

    /// Warn when restore meets placeholders with no mapping.
    pub warn_on_unmatched: bool,

    /// Log every span dropped during conflict resolution.
    pub log_conflicts: bool,

    /// Widen PERSON spans over a preceding title such as `Dr.`.
    pub person_titles: bool,

    /// Drop spans that fail their label's structural check.
    pub validate_structure: bool,

    /// Provider cache key.
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            batch_size: DEFAULT_BATCH_SIZE,
            enabled_domains: Vec::new(),
            excluded_labels: DEFAULT_EXCLUDED_LABELS.to_vec(),
            store_original: false,
            warn_on_unmatched: true,
            log_conflicts: false,
            person_titles: true,
            validate_structure: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum input length.
    #[must_use]
    pub const fn max_text_length(mut self, max: usize) -> Self {
        self.max_text_length = max;
        self
    }

    /// Set the stream window size.
    #[must_use]
    pub const fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the stream window overlap.
    #[must_use]
    pub const fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    /// Set the batch group size.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Switch on a pattern domain.
    #[must_use]
    pub fn enable_domain(mut self, domain: PatternDomain) -> Self {
        if !self.enabled_domains.contains(&domain) {
            self.enabled_domains.push(domain);
        }
        self
    }

    /// Switch on every pattern domain.
    #[must_use]
    pub fn enable_all_domains(mut self) -> Self {
        self.enabled_domains = PatternDomain::ALL.to_vec();
        self
    }

    /// Replace the excluded labels.
    #[must_use]
    pub fn excluded_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = EntityLabel>,
    {
        self.excluded_labels = labels.into_iter().collect();
        self
    }

    /// Set whether results keep the input text.
    #[must_use]
    pub const fn store_original(mut self, store: bool) -> Self {
        self.store_original = store;
        self
    }

    /// Set whether restore warns on unmatched placeholders.
    #[must_use]
    pub const fn warn_on_unmatched(mut self, warn: bool) -> Self {
        self.warn_on_unmatched = warn;
        self
    }

    /// Set whether overlap decisions are logged.
    #[must_use]
    pub const fn log_conflicts(mut self, log: bool) -> Self {
        self.log_conflicts = log;
        self
    }

    /// Set whether person titles are folded into PERSON spans.
    #[must_use]
    pub const fn person_titles(mut self, enabled: bool) -> Self {
        self.person_titles = enabled;
        self
    }

    /// Set whether structural validators filter spans.
    #[must_use]
    pub const fn validate_structure(mut self, enabled: bool) -> Self {
        self.validate_structure = enabled;
        self
    }

    /// Set the provider cache key.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns a config error for zero sizes, an overlap not smaller than
    /// the window, or an empty language key.
    pub fn validate(&self) -> Result<()> {
        if self.max_text_length == 0 {
            return Err(InconnuError::config("max_text_length must be greater than zero"));
        }
        if self.chunk_size == 0 {
            return Err(InconnuError::config("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(InconnuError::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.batch_size == 0 {
            return Err(InconnuError::config("batch_size must be greater than zero"));
        }
        if self.language.trim().is_empty() {
            return Err(InconnuError::config("language must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_text_length, 75_000);
        assert!(config.excluded_labels.contains(&EntityLabel::Cardinal));
        assert!(!config.store_original);
    }

    #[test]
    fn builder_setters() {
        let config = Config::new()
            .chunk_size(500)
            .chunk_overlap(50)
            .enable_domain(PatternDomain::Healthcare)
            .enable_domain(PatternDomain::Healthcare)
            .language("de");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.enabled_domains, [PatternDomain::Healthcare]);
        assert_eq!(config.language, "de");
    }

    #[test]
    fn rejects_inconsistent_sizes() {
        assert!(Config::new().chunk_size(0).validate().is_err());
        assert!(Config::new().chunk_size(100).chunk_overlap(100).validate().is_err());
        assert!(Config::new().batch_size(0).validate().is_err());
        assert!(Config::new().max_text_length(0).validate().is_err());
        assert!(Config::new().language(" ").validate().unwrap_err().is_config());
    }
}

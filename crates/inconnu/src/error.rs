//! Error types for inconnu.
//!
//! This module defines all error types used throughout the library.
//! Failures are surfaced, never papered over: no entry point returns the
//! unredacted input as a fallback when something goes wrong.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error produced by an external span provider.
pub type ProviderError = Box<dyn StdError + Send + Sync + 'static>;

/// Maximum length of a provider message to display in error messages.
const MAX_MESSAGE_DISPLAY: usize = 200;

/// Truncate long messages so error output never dumps large documents.
fn truncate_message(message: &str) -> String {
    if message.len() <= MAX_MESSAGE_DISPLAY {
        return message.to_string();
    }

    let mut end = MAX_MESSAGE_DISPLAY;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &message[..end], message.len())
}

/// The main error type for inconnu operations.
#[derive(Debug, Error)]
pub enum InconnuError {
    /// A span was rejected before conflict resolution.
    #[error("invalid span: {reason}")]
    InvalidSpan {
        /// Why the span was rejected.
        reason: String,
    },

    /// Input exceeds the configured maximum length.
    #[error("text length {length} exceeds maximum allowed length of {max}")]
    TextTooLong {
        /// Length of the rejected input in characters.
        length: usize,
        /// Configured limit in characters.
        max: usize,
    },

    /// A span provider or custom component failed.
    #[error("processing failed: {}", truncate_message(message))]
    Processing {
        /// What was being done when the provider failed.
        message: String,
        /// The provider's original error.
        #[source]
        source: ProviderError,
    },

    /// Invalid configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// A label that cannot be expressed as a placeholder.
    #[error("invalid entity label '{label}': custom labels must match [A-Z_]+ and not reuse a built-in tag")]
    InvalidLabel {
        /// The offending label.
        label: String,
    },

    /// A custom component that cannot be constructed.
    #[error("invalid custom component: {message}")]
    InvalidComponent {
        /// Description of the problem.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid regex pattern.
    #[error("invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A worker pool task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for inconnu operations.
pub type Result<T> = std::result::Result<T, InconnuError>;

impl InconnuError {
    /// Create an invalid span error.
    pub fn invalid_span(reason: impl Into<String>) -> Self {
        Self::InvalidSpan {
            reason: reason.into(),
        }
    }

    /// Create a text-too-long error.
    #[must_use]
    pub const fn text_too_long(length: usize, max: usize) -> Self {
        Self::TextTooLong { length, max }
    }

    /// Wrap a provider failure.
    pub fn processing(message: impl Into<String>, source: impl Into<ProviderError>) -> Self {
        Self::Processing {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid label error.
    pub fn invalid_label(label: impl Into<String>) -> Self {
        Self::InvalidLabel {
            label: label.into(),
        }
    }

    /// Create an invalid component error.
    pub fn invalid_component(message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            message: message.into(),
        }
    }

    /// Check if this is a length-exceeded error.
    #[must_use]
    pub const fn is_text_too_long(&self) -> bool {
        matches!(self, Self::TextTooLong { .. })
    }

    /// Check if this is a provider failure.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_too_long_display() {
        let err = InconnuError::text_too_long(80_000, 75_000);
        let msg = err.to_string();
        assert!(msg.contains("80000"));
        assert!(msg.contains("75000"));
        assert!(err.is_text_too_long());
    }

    #[test]
    fn processing_keeps_source() {
        let cause = std::io::Error::other("model exploded");
        let err = InconnuError::processing("span detection", cause);
        assert!(err.is_processing());

        let source = err.source().expect("source is preserved");
        assert!(source.to_string().contains("model exploded"));
    }

    #[test]
    fn processing_message_truncated() {
        let long = "x".repeat(1_000);
        let err = InconnuError::processing(long, std::io::Error::other("boom"));
        let msg = err.to_string();
        assert!(msg.contains("1000 bytes total"));
        assert!(msg.len() < 400);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(150);
        let truncated = truncate_message(&text);
        assert!(truncated.contains("bytes total"));
    }

    #[test]
    fn config_error_display() {
        let err = InconnuError::config("chunk_size must be greater than 0");
        assert!(err.is_config());
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn invalid_label_display() {
        let err = InconnuError::invalid_label("person-name");
        assert!(err.to_string().contains("person-name"));
    }
}

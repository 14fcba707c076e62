//! Processing results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::redaction::{EntityMap, PositionMap};

/// Output of one [`Inconnu::process`](crate::Inconnu::process) call.
///
/// The engine never touches a result after returning it. Hosts may rewrite
/// `redacted_text` freely before restoring; [`is_unchanged`](Self::is_unchanged)
/// tells whether the recorded positions still apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    /// The input text, kept only when the engine is configured to store it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    /// The redacted text.
    pub redacted_text: String,
    /// Placeholder to original value. Empty for irreversible redaction.
    #[serde(default)]
    pub entity_map: EntityMap,
    /// Placeholder to range in `redacted_text`. Empty for irreversible
    /// redaction.
    #[serde(default)]
    pub position_map: PositionMap,
    /// Input length in characters.
    pub text_length: usize,
    /// Lowercase hex SHA-256 of the input.
    pub hashed_id: String,
    /// When processing started.
    pub timestamp: DateTime<Utc>,
    /// Wall-clock processing time.
    pub processing_time_ms: f64,
    /// Whether placeholders are indexed and restorable.
    pub reversible: bool,
    /// Number of spans replaced.
    pub entity_count: usize,
}

impl ProcessedResult {
    /// Check whether `redacted_text` still matches the recorded positions.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.position_map
            .iter()
            .all(|(token, range)| self.redacted_text.get(range.start..range.end) == Some(token.as_str()))
    }

    /// Check whether the result can be restored.
    #[must_use]
    pub fn is_restorable(&self) -> bool {
        self.reversible && !self.entity_map.is_empty()
    }
}

/// Lowercase hex SHA-256 digest of `text`.
#[must_use]
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

//! Placeholder restoration.
//!
//! Redacted text often passes through another system (an LLM, a human
//! editor) before it comes back for restoration. Two strategies cover that:
//!
//! - [`RestoreStrategy::Positions`]: every recorded placeholder is still at
//!   its recorded offset, so exactly those ranges are replaced. Placeholder
//!   lookalikes that were already in the source document are left alone.
//! - [`RestoreStrategy::Scan`]: the text was edited; every placeholder-shaped
//!   token that is a key of the entity map is replaced wherever it occurs.
//!
//! Tokens with no mapping are left in place and reported. They usually mean
//! a downstream model invented a placeholder that was never redacted.

use std::collections::HashSet;

use regex::Captures;
use tracing::{debug, warn};

use crate::placeholder::{PLACEHOLDER_RE, find_placeholders};
use crate::redaction::{EntityMap, PositionMap};

/// How a restore call substituted placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreStrategy {
    /// Exact offsets from the position map.
    Positions,
    /// Grammar scan over the whole text.
    Scan,
}

/// Result of a restore call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    /// The restored text.
    pub text: String,
    /// Strategy that produced `text`.
    pub strategy: RestoreStrategy,
    /// Placeholder-shaped tokens left in `text` without a mapping, in order
    /// of first appearance.
    pub unmatched: Vec<String>,
}

impl RestoreReport {
    /// Check whether any unmatched tokens were found.
    #[must_use]
    pub fn has_unmatched(&self) -> bool {
        !self.unmatched.is_empty()
    }
}

/// Substitutes original values back into redacted text.
#[derive(Debug, Clone, Copy)]
pub struct Restorer {
    warn_on_unmatched: bool,
}

impl Default for Restorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Restorer {
    /// Create a restorer that warns on unmatched tokens.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            warn_on_unmatched: true,
        }
    }

    /// Set whether unmatched tokens produce a warning.
    #[must_use]
    pub const fn warn_on_unmatched(mut self, enabled: bool) -> Self {
        self.warn_on_unmatched = enabled;
        self
    }

    /// Restore `text` using only the entity map.
    #[must_use]
    pub fn restore(&self, text: &str, entity_map: &EntityMap) -> String {
        self.restore_with_report(text, entity_map, None).text
    }

    /// Restore `text`, preferring exact positions when they still hold.
    ///
    /// The position map is used only if every entry is consistent with
    /// `text`; a single stale entry switches the whole call to scanning.
    #[must_use]
    pub fn restore_with_report(
        &self,
        text: &str,
        entity_map: &EntityMap,
        positions: Option<&PositionMap>,
    ) -> RestoreReport {
        if entity_map.is_empty() {
            return RestoreReport {
                text: text.to_string(),
                strategy: RestoreStrategy::Scan,
                unmatched: Vec::new(),
            };
        }

        let (restored, strategy) = match positions.filter(|p| positions_hold(text, entity_map, p)) {
            Some(positions) => (restore_at_positions(text, entity_map, positions), RestoreStrategy::Positions),
            None => (restore_by_scan(text, entity_map), RestoreStrategy::Scan),
        };
        let unmatched = unmatched_tokens(text, entity_map);

        debug!(?strategy, unmatched = unmatched.len(), "Restored placeholders");
        if self.warn_on_unmatched && !unmatched.is_empty() {
            warn!(
                tokens = ?unmatched,
                "Found placeholders with no mapping; they were left in place"
            );
        }

        RestoreReport {
            text: restored,
            strategy,
            unmatched,
        }
    }
}

fn positions_hold(text: &str, entity_map: &EntityMap, positions: &PositionMap) -> bool {
    !positions.is_empty()
        && positions.iter().all(|(token, range)| {
            entity_map.contains_key(token) && text.get(range.start..range.end) == Some(token.as_str())
        })
}

fn restore_at_positions(text: &str, entity_map: &EntityMap, positions: &PositionMap) -> String {
    let mut ordered: Vec<_> = positions.iter().collect();
    ordered.sort_by_key(|(_, range)| range.start);

    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    for (token, range) in ordered {
        // Ranges hold distinct tokens and so cannot overlap; guard anyway
        // against a hand-built map.
        if range.start < last_end {
            continue;
        }
        out.push_str(&text[last_end..range.start]);
        match entity_map.get(token) {
            Some(original) => out.push_str(original),
            None => out.push_str(token),
        }
        last_end = range.end;
    }
    out.push_str(&text[last_end..]);
    out
}

fn restore_by_scan(text: &str, entity_map: &EntityMap) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let token = &caps[0];
            entity_map
                .get(token)
                .map_or_else(|| token.to_string(), Clone::clone)
        })
        .into_owned()
}

fn unmatched_tokens(text: &str, entity_map: &EntityMap) -> Vec<String> {
    let mut seen = HashSet::new();
    find_placeholders(text)
        .map(|m| m.as_str())
        .filter(|token| !entity_map.contains_key(*token))
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

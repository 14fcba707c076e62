//! Placeholder substitution.
//!
//! Turns resolved spans into placeholder tokens, rewrites the text and
//! records where each token landed. Spans are numbered walking from the end
//! of the document towards the start, so the last occurrence of a label gets
//! index 0.
//!
//! Positions are recorded while the output is assembled rather than by
//! searching the finished text, which keeps them exact even when the input
//! already contained placeholder-shaped strings.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::label::EntityLabel;
use crate::placeholder::placeholder;
use crate::span::{EntitySpan, TextRange};

/// Placeholder token to original text.
pub type EntityMap = BTreeMap<String, String>;

/// Placeholder token to its byte range in the redacted text.
pub type PositionMap = BTreeMap<String, TextRange>;

/// Labels left alone unless configured otherwise: bare numbers and
/// amounts are rarely identifying and redacting them hurts readability.
pub const DEFAULT_EXCLUDED_LABELS: [EntityLabel; 5] = [
    EntityLabel::Cardinal,
    EntityLabel::Ordinal,
    EntityLabel::Quantity,
    EntityLabel::Percent,
    EntityLabel::Money,
];

/// Output of a redaction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redaction {
    /// The rewritten text.
    pub text: String,
    /// Original value of each placeholder. Empty when not reversible.
    pub entity_map: EntityMap,
    /// Range of each placeholder in `text`. Empty when not reversible.
    pub position_map: PositionMap,
    /// Spans actually replaced, after trimming, in document order.
    pub spans: Vec<EntitySpan>,
}

/// Rewrites text by replacing spans with placeholders.
#[derive(Debug, Clone)]
pub struct Redactor {
    excluded: Vec<EntityLabel>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    /// Create a redactor with the default exclusions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            excluded: DEFAULT_EXCLUDED_LABELS.to_vec(),
        }
    }

    /// Replace the excluded label set.
    #[must_use]
    pub fn excluded_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = EntityLabel>,
    {
        self.excluded = labels.into_iter().collect();
        self
    }

    /// Get the excluded labels.
    #[must_use]
    pub fn excluded(&self) -> &[EntityLabel] {
        &self.excluded
    }

    /// Check whether spans with `label` are redacted.
    #[must_use]
    pub fn is_redacted(&self, label: &EntityLabel) -> bool {
        !self.excluded.contains(label)
    }

    /// Redact `text` using resolved, non-overlapping spans.
    ///
    /// When `reversible` is set, placeholders carry a per-label index and the
    /// entity and position maps are filled in; otherwise only the text is
    /// produced and no original value is retained.
    #[must_use]
    pub fn redact(&self, text: &str, spans: &[EntitySpan], reversible: bool) -> Redaction {
        let kept = self.prepare(text, spans);

        // Number from the end of the document towards the start.
        let mut counters: HashMap<&EntityLabel, usize> = HashMap::new();
        let mut tokens = vec![String::new(); kept.len()];
        for (i, span) in kept.iter().enumerate().rev() {
            let index = reversible.then(|| {
                let counter = counters.entry(span.label()).or_insert(0);
                let n = *counter;
                *counter += 1;
                n
            });
            tokens[i] = placeholder(span.label(), index);
        }

        let mut redaction = Redaction {
            text: String::with_capacity(text.len()),
            ..Redaction::default()
        };
        let mut last_end = 0;

        for (span, token) in kept.iter().zip(tokens) {
            redaction.text.push_str(&text[last_end..span.start()]);
            let start = redaction.text.len();
            redaction.text.push_str(&token);

            if reversible {
                redaction
                    .position_map
                    .insert(token.clone(), TextRange::new(start, redaction.text.len()));
                redaction.entity_map.insert(token, span.text().to_string());
            }
            last_end = span.end();
        }
        redaction.text.push_str(&text[last_end..]);
        redaction.spans = kept;

        redaction
    }

    /// Drop excluded and overlapping spans and trim the rest to one line.
    fn prepare(&self, text: &str, spans: &[EntitySpan]) -> Vec<EntitySpan> {
        let mut ordered: Vec<&EntitySpan> = spans.iter().collect();
        ordered.sort_by_key(|span| (span.start(), span.end()));

        let mut kept: Vec<EntitySpan> = Vec::with_capacity(ordered.len());
        let mut last_end = 0;

        for span in ordered {
            if !self.is_redacted(span.label()) {
                debug!(label = %span.label(), "Skipping excluded label");
                continue;
            }
            let Some(trimmed) = trim_to_line(text, span) else {
                debug!(label = %span.label(), start = span.start(), "Span is empty after trimming");
                continue;
            };
            if trimmed.start() < last_end {
                debug!(label = %span.label(), start = span.start(), "Skipping overlapping span");
                continue;
            }
            last_end = trimmed.end();
            kept.push(trimmed);
        }

        kept
    }
}

/// Cut a span at its first line break and drop trailing horizontal
/// whitespace. Returns `None` if nothing remains.
fn trim_to_line(text: &str, span: &EntitySpan) -> Option<EntitySpan> {
    let covered = span.text();
    let line = covered.find('\n').map_or(covered, |i| &covered[..i]);
    let line = line.trim_end_matches([' ', '\t', '\r']);

    if line.is_empty() {
        return None;
    }
    if line.len() == covered.len() {
        return Some(span.clone());
    }

    EntitySpan::new(span.label().clone(), span.start(), span.start() + line.len(), text)
        .ok()
        .map(|trimmed| trimmed.with_priority(span.source_priority()))
}

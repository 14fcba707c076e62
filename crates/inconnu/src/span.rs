//! Entity spans and span validation.
//!
//! Providers emit [`SpanCandidate`]s with signed offsets so that buggy
//! output (negative or inverted ranges) can be represented and rejected here
//! instead of crashing the pipeline. Validated spans become immutable
//! [`EntitySpan`]s that borrow nothing from the document.
//!
//! Offsets are byte offsets into UTF-8 text and must fall on character
//! boundaries.

use serde::{Deserialize, Serialize};

use crate::error::{InconnuError, Result};
use crate::label::EntityLabel;

/// A half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl TextRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check whether two ranges share at least one offset.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A raw detection from a span provider, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanCandidate {
    /// Entity label.
    pub label: EntityLabel,
    /// Start offset (may be invalid).
    pub start: i64,
    /// End offset (may be invalid).
    pub end: i64,
    /// Priority hint overriding the label's default weight.
    pub source_priority: Option<i32>,
}

impl SpanCandidate {
    /// Create a candidate from raw offsets.
    #[must_use]
    pub const fn new(label: EntityLabel, start: i64, end: i64) -> Self {
        Self {
            label,
            start,
            end,
            source_priority: None,
        }
    }

    /// Create a candidate from a byte range, such as a regex match.
    #[must_use]
    pub fn from_range(label: EntityLabel, start: usize, end: usize) -> Self {
        Self::new(
            label,
            i64::try_from(start).unwrap_or(i64::MAX),
            i64::try_from(end).unwrap_or(i64::MAX),
        )
    }

    /// Attach a priority hint.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.source_priority = Some(priority);
        self
    }
}

/// A validated, labeled range of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySpan {
    label: EntityLabel,
    start: usize,
    end: usize,
    text: String,
    source_priority: Option<i32>,
}

impl EntitySpan {
    /// Create a span over `document[start..end]`.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::InvalidSpan`] if the range is empty, out of
    /// bounds or splits a UTF-8 character.
    pub fn new(label: EntityLabel, start: usize, end: usize, document: &str) -> Result<Self> {
        if start >= end {
            return Err(InconnuError::invalid_span(format!(
                "{label}[{start}:{end}]: start must be before end"
            )));
        }
        if start >= document.len() || end > document.len() {
            return Err(InconnuError::invalid_span(format!(
                "{label}[{start}:{end}]: out of bounds for document of length {}",
                document.len()
            )));
        }
        let Some(text) = document.get(start..end) else {
            return Err(InconnuError::invalid_span(format!(
                "{label}[{start}:{end}]: not on a character boundary"
            )));
        };

        Ok(Self {
            label,
            start,
            end,
            text: text.to_string(),
            source_priority: None,
        })
    }

    /// Attach a priority hint.
    #[must_use]
    pub const fn with_priority(mut self, priority: Option<i32>) -> Self {
        self.source_priority = priority;
        self
    }

    /// The entity label.
    #[must_use]
    pub const fn label(&self) -> &EntityLabel {
        &self.label
    }

    /// Start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// End offset.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// The byte range covered.
    #[must_use]
    pub const fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }

    /// The covered text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The provider's priority hint, if any.
    #[must_use]
    pub const fn source_priority(&self) -> Option<i32> {
        self.source_priority
    }

    /// Effective priority: the provider hint, else the label weight.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.source_priority.unwrap_or_else(|| self.label.priority())
    }

    /// Length of the span in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Spans are never empty once validated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Check whether two spans share at least one offset.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.range().overlaps(&other.range())
    }
}

/// Outcome of span validation.
#[derive(Debug, Clone, Default)]
pub struct SpanValidation {
    /// Spans that passed.
    pub valid: Vec<EntitySpan>,
    /// One human-readable message per rejected candidate.
    pub errors: Vec<String>,
}

impl SpanValidation {
    /// Check if any candidate was rejected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate provider output against a document.
///
/// Never fails: each malformed candidate is dropped and described in
/// [`SpanValidation::errors`].
#[must_use]
pub fn validate_spans<I>(candidates: I, document: &str) -> SpanValidation
where
    I: IntoIterator<Item = SpanCandidate>,
{
    let mut outcome = SpanValidation::default();

    for candidate in candidates {
        match check_candidate(candidate, document) {
            Ok(span) => outcome.valid.push(span),
            Err(reason) => outcome.errors.push(reason),
        }
    }

    outcome
}

fn check_candidate(candidate: SpanCandidate, document: &str) -> std::result::Result<EntitySpan, String> {
    let SpanCandidate {
        label,
        start,
        end,
        source_priority,
    } = candidate;

    if start < 0 {
        return Err(format!("Invalid span {label}[{start}:{end}]: negative start offset"));
    }
    if end < 0 {
        return Err(format!("Invalid span {label}[{start}:{end}]: negative end offset"));
    }
    if start >= end {
        return Err(format!("Invalid span {label}[{start}:{end}]: start >= end"));
    }

    let (Ok(start_idx), Ok(end_idx)) = (usize::try_from(start), usize::try_from(end)) else {
        return Err(format!("Invalid span {label}[{start}:{end}]: offset overflow"));
    };

    EntitySpan::new(label, start_idx, end_idx, document)
        .map(|span| span.with_priority(source_priority))
        .map_err(|e| match e {
            InconnuError::InvalidSpan { reason } => format!("Invalid span {reason}"),
            other => other.to_string(),
        })
}

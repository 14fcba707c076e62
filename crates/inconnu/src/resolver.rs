//! Conflict resolution over overlapping entity spans.
//!
//! Candidates from every provider are merged into a single non-overlapping
//! selection. Spans are swept in order of start offset, then length, then
//! priority; a span is kept only if none of its offsets are already covered.
//! The ordering has a full tie-break chain so the selection never depends on
//! the order in which providers reported their spans.

use std::cmp::Ordering;

use tracing::debug;

use crate::span::EntitySpan;

/// Ordering used by the sweep.
///
/// Ascending start, longer spans first, higher priority first, longer text
/// first, then text and label lexicographically. Spans equal up to this point
/// differ at most in their priority hint; an explicit hint sorts first.
#[must_use]
pub fn sweep_order(a: &EntitySpan, b: &EntitySpan) -> Ordering {
    a.start()
        .cmp(&b.start())
        .then_with(|| b.len().cmp(&a.len()))
        .then_with(|| b.priority().cmp(&a.priority()))
        .then_with(|| b.text().chars().count().cmp(&a.text().chars().count()))
        .then_with(|| a.text().cmp(b.text()))
        .then_with(|| a.label().as_str().cmp(b.label().as_str()))
        .then_with(|| b.source_priority().cmp(&a.source_priority()))
}

/// Selects a maximal set of non-overlapping spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver {
    log_conflicts: bool,
}

impl ConflictResolver {
    /// Create a new resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log_conflicts: false,
        }
    }

    /// Emit a debug event for every span dropped due to an overlap.
    #[must_use]
    pub const fn log_conflicts(mut self, enabled: bool) -> Self {
        self.log_conflicts = enabled;
        self
    }

    /// Resolve candidates into non-overlapping spans ordered by start.
    #[must_use]
    pub fn resolve(&self, mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
        if spans.len() < 2 {
            return spans;
        }

        spans.sort_by(sweep_order);

        // Candidates arrive in start order and kept spans never overlap, so a
        // candidate collides with a kept span iff it starts before the
        // furthest end seen so far.
        let mut kept: Vec<EntitySpan> = Vec::with_capacity(spans.len());
        let mut covered_until = 0usize;

        for span in spans {
            if span.start() < covered_until {
                if let Some(winner) = kept.last().filter(|_| self.log_conflicts) {
                    debug!(
                        dropped = %span.label(),
                        dropped_text = span.text(),
                        start = span.start(),
                        end = span.end(),
                        kept = %winner.label(),
                        "Dropping overlapping span"
                    );
                }
                continue;
            }
            covered_until = span.end();
            kept.push(span);
        }

        kept
    }

    /// Resolve two tiers of spans.
    ///
    /// `pinned` spans are resolved among themselves first; any span in
    /// `rest` that overlaps a pinned span is dropped before the remainder is
    /// resolved. The merged output is ordered by start.
    #[must_use]
    pub fn resolve_layered(&self, pinned: Vec<EntitySpan>, rest: Vec<EntitySpan>) -> Vec<EntitySpan> {
        let pinned = self.resolve(pinned);
        if pinned.is_empty() {
            return self.resolve(rest);
        }

        let survivors: Vec<EntitySpan> = rest
            .into_iter()
            .filter(|span| {
                let blocked = overlaps_any(&pinned, span);
                if blocked && self.log_conflicts {
                    debug!(
                        dropped = %span.label(),
                        dropped_text = span.text(),
                        start = span.start(),
                        end = span.end(),
                        "Dropping span overlapping a pinned component span"
                    );
                }
                !blocked
            })
            .collect();

        let mut merged = pinned;
        merged.extend(self.resolve(survivors));
        merged.sort_by(sweep_order);
        merged
    }
}

/// Check `span` against spans sorted by start that do not overlap each other.
fn overlaps_any(sorted: &[EntitySpan], span: &EntitySpan) -> bool {
    // First kept span ending after the candidate's start is the only one
    // that can overlap it.
    let idx = sorted.partition_point(|kept| kept.end() <= span.start());
    sorted.get(idx).is_some_and(|kept| kept.start() < span.end())
}

/// Check that no two spans share an offset.
#[must_use]
pub fn is_non_overlapping(spans: &[EntitySpan]) -> bool {
    let mut ranges: Vec<_> = spans.iter().map(EntitySpan::range).collect();
    ranges.sort();
    ranges.windows(2).all(|pair| pair[0].end <= pair[1].start)
}

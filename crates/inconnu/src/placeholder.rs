//! Placeholder token grammar.
//!
//! Redacted spans are replaced by `[LABEL]` when anonymizing and by
//! `[LABEL_n]` when pseudonymizing. Every token matches
//! [`PLACEHOLDER_PATTERN`], which is the wire format other systems rely on
//! to find tokens in text.

use std::sync::LazyLock;

use regex::Regex;

use crate::label::EntityLabel;

/// Regular expression matching any placeholder token.
pub const PLACEHOLDER_PATTERN: &str = r"\[[A-Z_]+(_\d+)?\]";

/// Compiled [`PLACEHOLDER_PATTERN`].
pub static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is a valid regex"));

/// Render the placeholder for a label.
///
/// `index` is present only for reversible redaction.
#[must_use]
pub fn placeholder(label: &EntityLabel, index: Option<usize>) -> String {
    match index {
        Some(n) => format!("[{}_{n}]", label.as_str()),
        None => format!("[{}]", label.as_str()),
    }
}

/// Check whether `token` is exactly one placeholder.
#[must_use]
pub fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER_RE
        .find(token)
        .is_some_and(|m| m.start() == 0 && m.end() == token.len())
}

/// Iterate over placeholder-shaped tokens in `text`.
pub fn find_placeholders(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    PLACEHOLDER_RE.find_iter(text)
}

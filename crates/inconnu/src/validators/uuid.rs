//! UUID validation.

use regex::Regex;
use std::sync::LazyLock;

use super::Verdict;

static UUID_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("UUID format is a valid regex")
});

/// Validate an RFC 4122 UUID of version 1 through 5.
#[must_use]
pub fn validate_uuid(text: &str) -> Verdict {
    if UUID_FORMAT.is_match(text) {
        Verdict::accept(0.95)
    } else {
        Verdict::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").valid);
        assert!(validate_uuid("550E8400-E29B-11D4-A716-446655440000").valid);
    }

    #[test]
    fn bad_version_or_variant() {
        assert!(!validate_uuid("550e8400-e29b-61d4-a716-446655440000").valid);
        assert!(!validate_uuid("550e8400-e29b-41d4-c716-446655440000").valid);
    }

    #[test]
    fn bad_layout() {
        assert!(!validate_uuid("550e8400e29b41d4a716446655440000").valid);
    }
}

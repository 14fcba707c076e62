//! ABA routing transit number validation.

use super::{Verdict, digits_of};

const WEIGHTS: [u32; 9] = [3, 7, 1, 3, 7, 1, 3, 7, 1];

/// Validate a nine-digit US routing number with the ABA weighted checksum.
#[must_use]
pub fn validate_routing_number(text: &str) -> Verdict {
    if text.len() != 9 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Verdict::INVALID;
    }

    let total: u32 = digits_of(text)
        .iter()
        .zip(WEIGHTS)
        .map(|(d, w)| d * w)
        .sum();

    if total.is_multiple_of(10) {
        Verdict::accept(0.95)
    } else {
        Verdict::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_routing_number() {
        let verdict = validate_routing_number("111000025");
        assert!(verdict.valid);
        assert!((verdict.confidence - 0.95).abs() < f32::EPSILON);
        assert!(validate_routing_number("021000021").valid);
    }

    #[test]
    fn invalid_routing_number() {
        assert!(!validate_routing_number("111000026").valid);
        assert!(!validate_routing_number("11100002").valid);
        assert!(!validate_routing_number("11100002a").valid);
    }
}

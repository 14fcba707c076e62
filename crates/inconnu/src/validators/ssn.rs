//! US Social Security Number validation.

use regex::Regex;
use std::sync::LazyLock;

use super::Verdict;

static SSN_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{3})-(\d{2})-(\d{4})$").expect("SSN format is a valid regex")
});

/// Widely published sample numbers, accepted with reduced confidence.
const SAMPLE_SSNS: [&str; 3] = ["123-45-6789", "078-05-1120", "219-09-9999"];

/// Validate an SSN in `DDD-DD-DDDD` form.
///
/// Rejects area `000`, `666` and `900`-`999`, group `00` and serial `0000`.
#[must_use]
pub fn validate_ssn(text: &str) -> Verdict {
    let Some(caps) = SSN_FORMAT.captures(text) else {
        return Verdict::INVALID;
    };

    let area: u16 = caps[1].parse().unwrap_or(0);
    let group: u16 = caps[2].parse().unwrap_or(0);
    let serial: u16 = caps[3].parse().unwrap_or(0);

    if area == 0 || area == 666 || area >= 900 {
        return Verdict::INVALID;
    }
    if group == 0 || serial == 0 {
        return Verdict::INVALID;
    }

    if SAMPLE_SSNS.contains(&text) {
        return Verdict::accept(0.9);
    }
    Verdict::accept(0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_number_accepted() {
        let verdict = validate_ssn("123-45-6789");
        assert!(verdict.valid);
        assert!(verdict.confidence >= 0.9);
    }

    #[test]
    fn ordinary_number_high_confidence() {
        let verdict = validate_ssn("234-56-7890");
        assert!(verdict.valid);
        assert!((verdict.confidence - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn reserved_areas_rejected() {
        assert_eq!(validate_ssn("666-12-3456"), Verdict::INVALID);
        assert_eq!(validate_ssn("000-12-3456"), Verdict::INVALID);
        assert_eq!(validate_ssn("900-12-3456"), Verdict::INVALID);
        assert_eq!(validate_ssn("999-12-3456"), Verdict::INVALID);
    }

    #[test]
    fn zero_group_or_serial_rejected() {
        assert!(!validate_ssn("123-00-6789").valid);
        assert!(!validate_ssn("123-45-0000").valid);
    }

    #[test]
    fn format_required() {
        assert!(!validate_ssn("123456789").valid);
        assert!(!validate_ssn("123-45-6789 ").valid);
        assert!(!validate_ssn("12-345-6789").valid);
    }
}

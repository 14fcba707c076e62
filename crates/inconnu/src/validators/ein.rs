//! US Employer Identification Number validation.

use super::Verdict;

/// Prefixes the IRS has never assigned.
pub const RESERVED_EIN_PREFIXES: [u8; 15] = [0, 7, 8, 9, 17, 18, 19, 28, 29, 49, 69, 70, 78, 79, 89];

/// Validate an EIN in `DD-DDDDDDD` form with an assignable prefix.
#[must_use]
pub fn validate_ein(text: &str) -> Verdict {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[2] == b'-'
        && bytes[..2].iter().all(u8::is_ascii_digit)
        && bytes[3..].iter().all(u8::is_ascii_digit);
    if !shaped {
        return Verdict::INVALID;
    }

    let prefix = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    if RESERVED_EIN_PREFIXES.contains(&prefix) {
        Verdict::INVALID
    } else {
        Verdict::accept(0.85)
    }
}

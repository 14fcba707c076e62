//! International Bank Account Number validation.

use super::Verdict;

/// Validate an IBAN with the ISO 13616 mod-97 check.
///
/// Spaces and dashes are ignored and letters are case-insensitive. The
/// first four characters move to the end, letters expand to `10..=35`, and
/// the resulting number must leave remainder 1 modulo 97.
#[must_use]
pub fn validate_iban(text: &str) -> Verdict {
    let iban: String = text
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if !(15..=34).contains(&iban.len()) || !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Verdict::INVALID;
    }
    if !iban.chars().take(2).all(|c| c.is_ascii_uppercase()) {
        return Verdict::INVALID;
    }

    match mod97(iban[4..].chars().chain(iban[..4].chars())) {
        Some(1) => Verdict::accept(0.95),
        _ => Verdict::INVALID,
    }
}

/// Remainder of the expanded numeric string, computed digit by digit.
///
/// Returns `None` on any character that is not an ASCII letter or digit.
fn mod97(chars: impl Iterator<Item = char>) -> Option<u32> {
    let mut remainder = 0u32;
    for c in chars {
        let value = c.to_digit(36)?;
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    Some(remainder)
}

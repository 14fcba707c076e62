//! Payment card validation.

use super::{Verdict, digits_of};

/// Card network, inferred from the number prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    /// Visa card (starts with 4).
    Visa,
    /// `MasterCard` (starts with 51-55).
    MasterCard,
    /// American Express (starts with 34 or 37).
    Amex,
    /// Discover card (starts with 6011 or 65).
    Discover,
    /// Unknown or unrecognized card type.
    Unknown,
}

impl CardType {
    /// Detect card type from a digit string.
    #[must_use]
    pub fn detect(digits: &str) -> Self {
        if digits.starts_with('4') {
            Self::Visa
        } else if ["51", "52", "53", "54", "55"].iter().any(|p| digits.starts_with(p)) {
            Self::MasterCard
        } else if digits.starts_with("34") || digits.starts_with("37") {
            Self::Amex
        } else if digits.starts_with("6011") || digits.starts_with("65") {
            Self::Discover
        } else {
            Self::Unknown
        }
    }
}

/// Check a digit sequence with the Luhn algorithm.
///
/// Every second digit from the right is doubled, subtracting 9 when the
/// product exceeds 9. The number is valid iff the total is a multiple of 10.
#[must_use]
pub fn luhn_check(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum.is_multiple_of(10)
}

/// Validate a card number of 13 to 19 digits.
///
/// Spaces and dashes are ignored. Known networks score `0.9`, other
/// Luhn-valid numbers `0.7`.
#[must_use]
pub fn validate_credit_card(text: &str) -> Verdict {
    let compact: String = text.chars().filter(|c| *c != ' ' && *c != '-').collect();

    if compact.is_empty() || !compact.chars().all(|c| c.is_ascii_digit()) {
        return Verdict::INVALID;
    }
    if !(13..=19).contains(&compact.len()) {
        return Verdict::INVALID;
    }
    if !luhn_check(&digits_of(&compact)) {
        return Verdict::INVALID;
    }

    match CardType::detect(&compact) {
        CardType::Unknown => Verdict::accept(0.7),
        _ => Verdict::accept(0.9),
    }
}

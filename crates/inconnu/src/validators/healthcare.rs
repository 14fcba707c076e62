//! Provider identifiers: NPI and DEA registration numbers.

use super::{Verdict, digits_of};

/// Card issuer prefix prepended to an NPI before the Luhn check.
const NPI_PREFIX: [u32; 5] = [8, 0, 8, 4, 0];

/// First letters a DEA registrant type may use.
const DEA_FIRST_LETTERS: &str = "ABCDEFGHJKLMPRSTUWX";

/// Validate a ten-digit National Provider Identifier.
///
/// The number is prefixed with `80840` and summed from the right, doubling
/// the digits at even zero-based indexes (the check digit included) and
/// reducing each product to its digit sum. The total must be a multiple
/// of ten.
#[must_use]
pub fn validate_npi(text: &str) -> Verdict {
    if text.len() != 10 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Verdict::INVALID;
    }

    let mut digits = NPI_PREFIX.to_vec();
    digits.extend(digits_of(text));

    let total: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 0 {
                let doubled = d * 2;
                doubled / 10 + doubled % 10
            } else {
                d
            }
        })
        .sum();

    if total.is_multiple_of(10) {
        Verdict::accept(0.95)
    } else {
        Verdict::INVALID
    }
}

/// Validate a DEA registration number: two uppercase letters and seven
/// digits.
///
/// The check digit is the last digit of `(d1 + d3 + d5) + 2 * (d2 + d4 + d6)`.
#[must_use]
pub fn validate_dea_number(text: &str) -> Verdict {
    let bytes = text.as_bytes();
    if bytes.len() != 9
        || !bytes[..2].iter().all(u8::is_ascii_uppercase)
        || !bytes[2..].iter().all(u8::is_ascii_digit)
    {
        return Verdict::INVALID;
    }
    if !DEA_FIRST_LETTERS.as_bytes().contains(&bytes[0]) {
        return Verdict::INVALID;
    }

    let d = digits_of(&text[2..]);
    let odd = d[0] + d[2] + d[4];
    let even = (d[1] + d[3] + d[5]) * 2;

    if (odd + even) % 10 == d[6] {
        Verdict::accept(0.95)
    } else {
        Verdict::INVALID
    }
}

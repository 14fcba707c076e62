//! Vehicle Identification Number validation.

use super::Verdict;

/// Validate a 17-character VIN.
///
/// Only layout is checked: uppercase letters and digits, excluding `I`, `O`
/// and `Q`. The manufacturer-specific check digit is not verified.
#[must_use]
pub fn validate_vin(text: &str) -> Verdict {
    let shaped = text.len() == 17
        && text
            .bytes()
            .all(|b| (b.is_ascii_uppercase() || b.is_ascii_digit()) && !matches!(b, b'I' | b'O' | b'Q'));

    if shaped { Verdict::accept(0.8) } else { Verdict::INVALID }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_vin() {
        assert!(validate_vin("1HGCM82633A004352").valid);
    }

    #[test]
    fn excluded_letters() {
        assert!(!validate_vin("1HGCM82633A00435I").valid);
        assert!(!validate_vin("1HGCM82633A00435O").valid);
        assert!(!validate_vin("1HGCM82633A00435Q").valid);
    }

    #[test]
    fn wrong_length_or_case() {
        assert!(!validate_vin("1HGCM82633A00435").valid);
        assert!(!validate_vin("1hgcm82633a004352").valid);
    }
}

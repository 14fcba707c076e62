//! Cryptocurrency address format checks.

use regex::Regex;
use std::sync::LazyLock;

use super::Verdict;

static BITCOIN_BASE58: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[13][a-km-zA-HJ-NP-Z1-9]{25,34}$").expect("Bitcoin base58 format is a valid regex")
});

static BITCOIN_BECH32: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^bc1[a-z0-9]{39,59}$").expect("Bitcoin bech32 format is a valid regex")
});

static ETHEREUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("Ethereum format is a valid regex")
});

/// Validate a Bitcoin address (P2PKH, P2SH or bech32) by format.
#[must_use]
pub fn validate_bitcoin_address(text: &str) -> Verdict {
    if BITCOIN_BASE58.is_match(text) || BITCOIN_BECH32.is_match(text) {
        Verdict::accept(0.85)
    } else {
        Verdict::INVALID
    }
}

/// Validate an Ethereum address by format. The EIP-55 checksum is not checked.
#[must_use]
pub fn validate_ethereum_address(text: &str) -> Verdict {
    if ETHEREUM.is_match(text) {
        Verdict::accept(0.85)
    } else {
        Verdict::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitcoin_formats() {
        assert!(validate_bitcoin_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").valid);
        assert!(validate_bitcoin_address("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy").valid);
        assert!(validate_bitcoin_address("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq").valid);
        assert!(!validate_bitcoin_address("2A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").valid);
        assert!(!validate_bitcoin_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7Divf0a").valid);
    }

    #[test]
    fn ethereum_format() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44e").valid);
        assert!(!validate_ethereum_address("742d35Cc6634C0532925a3b844Bc454e4438f44e").valid);
        assert!(!validate_ethereum_address("0x742d35Cc6634C0532925a3b844Bc454e4438f44").valid);
    }
}

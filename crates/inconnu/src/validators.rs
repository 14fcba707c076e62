//! Structural validators for pattern matches.
//!
//! Each validator scores how plausible a matched substring is as the
//! identifier it claims to be (checksum digits, reserved ranges, layout).
//! Validators are pure functions of the text.
//!
//! The [`ValidatorRegistry`] maps labels to validators. Labels without a
//! registered validator are trusted as-is with confidence `1.0`, since most
//! labels (PERSON, ORG, GPE...) have nothing to verify.
//!
//! # Example
//!
//! ```rust
//! use inconnu::validators::{validate_credit_card, validate_ssn};
//!
//! assert!(validate_ssn("123-45-6789").valid);
//! assert!(!validate_ssn("666-12-3456").valid);
//! assert!(validate_credit_card("4111111111111111").valid);
//! ```

pub mod credit_card;
pub mod crypto;
pub mod ein;
pub mod healthcare;
pub mod iban;
pub mod routing;
pub mod ssn;
pub mod uuid;
pub mod vin;

use std::collections::HashMap;

use crate::label::EntityLabel;

pub use credit_card::validate_credit_card;
pub use crypto::{validate_bitcoin_address, validate_ethereum_address};
pub use ein::validate_ein;
pub use healthcare::{validate_dea_number, validate_npi};
pub use iban::validate_iban;
pub use routing::validate_routing_number;
pub use ssn::validate_ssn;
pub use uuid::validate_uuid;
pub use vin::validate_vin;

/// Result of a structural check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Whether the text passed.
    pub valid: bool,
    /// Confidence in `0.0..=1.0`; always `0.0` when invalid.
    pub confidence: f32,
}

impl Verdict {
    /// A rejected match.
    pub const INVALID: Self = Self {
        valid: false,
        confidence: 0.0,
    };

    /// A match with nothing to verify.
    pub const TRUSTED: Self = Self {
        valid: true,
        confidence: 1.0,
    };

    /// An accepted match with the given confidence.
    #[must_use]
    pub const fn accept(confidence: f32) -> Self {
        Self {
            valid: true,
            confidence,
        }
    }
}

/// Signature of a structural validator.
pub type ValidatorFn = fn(&str) -> Verdict;

/// Maps labels to their validators.
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<EntityLabel, ValidatorFn>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// Create a registry with the built-in validators.
    #[must_use]
    pub fn new() -> Self {
        let mut validators: HashMap<EntityLabel, ValidatorFn> = HashMap::new();
        validators.insert(EntityLabel::Ssn, validate_ssn);
        validators.insert(EntityLabel::Iban, validate_iban);
        validators.insert(EntityLabel::CreditCard, validate_credit_card);
        validators.insert(EntityLabel::RoutingNumber, validate_routing_number);
        validators.insert(EntityLabel::Uuid, validate_uuid);
        validators.insert(EntityLabel::Ein, validate_ein);
        validators.insert(EntityLabel::Npi, validate_npi);
        validators.insert(EntityLabel::DeaNumber, validate_dea_number);
        validators.insert(EntityLabel::Vin, validate_vin);
        validators.insert(EntityLabel::BitcoinAddress, validate_bitcoin_address);
        validators.insert(EntityLabel::EthereumAddress, validate_ethereum_address);
        Self { validators }
    }

    /// Create a registry that trusts every label.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Register (or replace) the validator for a label.
    #[must_use]
    pub fn with(mut self, label: EntityLabel, validator: ValidatorFn) -> Self {
        self.validators.insert(label, validator);
        self
    }

    /// Remove the validator for a label so its matches are trusted.
    #[must_use]
    pub fn without(mut self, label: &EntityLabel) -> Self {
        self.validators.remove(label);
        self
    }

    /// Check if a label has a validator.
    #[must_use]
    pub fn has_validator(&self, label: &EntityLabel) -> bool {
        self.validators.contains_key(label)
    }

    /// Validate `text` as an instance of `label`.
    #[must_use]
    pub fn validate(&self, label: &EntityLabel, text: &str) -> Verdict {
        self.validators
            .get(label)
            .map_or(Verdict::TRUSTED, |validator| validator(text))
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Collect the ASCII digits of `text` as numbers.
pub(crate) fn digits_of(text: &str) -> Vec<u32> {
    text.chars().filter_map(|c| c.to_digit(10)).collect()
}

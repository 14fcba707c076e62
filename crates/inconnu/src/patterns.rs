//! Domain pattern catalog.
//!
//! Identifiers that no statistical model labels reliably (record numbers,
//! routing numbers, wallet addresses...) are matched by regular expressions
//! grouped into [`PatternDomain`]s. Domains are opt-in: a pipeline only runs
//! the domains its configuration enables.
//!
//! # Example
//!
//! ```rust
//! use inconnu::patterns::{PatternDomain, PatternRegistry};
//!
//! let registry = PatternRegistry::new()
//!     .with_domain(PatternDomain::Healthcare)
//!     .with_domain(PatternDomain::Financial);
//!
//! assert!(!registry.get_by_domain(PatternDomain::Healthcare).is_empty());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InconnuError, Result};
use crate::label::EntityLabel;
use crate::provider::CustomComponent;

/// Email addresses.
pub const EMAIL_PATTERN: &str = r"(?i)[a-z0-9.\-+_]+@[a-z0-9.\-+_]+\.[a-z]+";

/// IBANs, optionally grouped by spaces or dashes.
pub const IBAN_PATTERN: &str = r"\b[A-Z]{2}\d{2}(?:[ -]?[A-Z0-9]{1,4}){1,7}\b";

/// International phone numbers with a leading country code.
pub const PHONE_NUMBER_PATTERN: &str = r"\+\d{1,3} \d{1,4} \d{1,4}(?: ?\d{1,4})*";

/// A group of related identifier patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternDomain {
    /// Patient and provider identifiers.
    Healthcare,
    /// Cards, bank and wallet identifiers.
    Financial,
    /// Case numbers and citations.
    Legal,
    /// Employee records.
    Hr,
    /// Tickets, orders and customer handles.
    Support,
    /// Student records.
    Education,
    /// Study and participant identifiers.
    Research,
    /// Official documents and registrations.
    Government,
    /// Keys, hardware and resource identifiers.
    Technology,
}

impl PatternDomain {
    /// Every domain.
    pub const ALL: [Self; 9] = [
        Self::Healthcare,
        Self::Financial,
        Self::Legal,
        Self::Hr,
        Self::Support,
        Self::Education,
        Self::Research,
        Self::Government,
        Self::Technology,
    ];

    /// Lowercase name of the domain.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Healthcare => "healthcare",
            Self::Financial => "financial",
            Self::Legal => "legal",
            Self::Hr => "hr",
            Self::Support => "support",
            Self::Education => "education",
            Self::Research => "research",
            Self::Government => "government",
            Self::Technology => "technology",
        }
    }
}

impl fmt::Display for PatternDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternDomain {
    type Err = InconnuError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| InconnuError::config(format!("unknown pattern domain '{s}'")))
    }
}

/// A single catalog pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternEntry {
    /// Label assigned to matches.
    pub label: EntityLabel,
    /// Regex pattern.
    pub pattern: String,
    /// Resolution priority of matches.
    pub priority: i32,
    /// Domain this belongs to (if pre-built).
    pub domain: Option<PatternDomain>,
    /// Description of what this pattern detects.
    pub description: String,
    /// Characters that may not directly follow a match.
    pub not_followed_by: String,
}

impl PatternEntry {
    /// Create a new entry using the label's default priority.
    pub fn new(label: EntityLabel, pattern: impl Into<String>) -> Self {
        let priority = label.priority();
        Self {
            label,
            pattern: pattern.into(),
            priority,
            domain: None,
            description: String::new(),
            not_followed_by: String::new(),
        }
    }

    /// Override the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Add a description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Mark as part of a domain.
    #[must_use]
    pub const fn with_domain(mut self, domain: PatternDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Reject matches directly followed by any of `chars`.
    #[must_use]
    pub fn not_followed_by(mut self, chars: impl Into<String>) -> Self {
        self.not_followed_by = chars.into();
        self
    }

    /// Compile into a pipeline component.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile or matches the
    /// empty string.
    pub fn to_component(&self) -> Result<CustomComponent> {
        Ok(CustomComponent::pattern(self.label.clone(), &self.pattern)?
            .with_priority(self.priority)
            .with_trailing_guard(self.not_followed_by.chars()))
    }
}

/// Registry of catalog patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<PatternEntry>,
}

impl PatternRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the given domains.
    #[must_use]
    pub fn for_domains<I>(domains: I) -> Self
    where
        I: IntoIterator<Item = PatternDomain>,
    {
        domains.into_iter().fold(Self::new(), Self::with_domain)
    }

    /// Add a custom pattern.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, entry: PatternEntry) -> Self {
        self.patterns.push(entry);
        self
    }

    /// Add every pre-built pattern of a domain. Adding a domain twice is a
    /// no-op.
    #[must_use]
    pub fn with_domain(mut self, domain: PatternDomain) -> Self {
        if self.patterns.iter().any(|p| p.domain == Some(domain)) {
            return self;
        }
        self.patterns.extend(builtin_entries(domain));
        self
    }

    /// Add every pre-built domain.
    #[must_use]
    pub fn with_all(self) -> Self {
        PatternDomain::ALL.into_iter().fold(self, Self::with_domain)
    }

    /// Get all registered patterns.
    #[must_use]
    pub fn patterns(&self) -> &[PatternEntry] {
        &self.patterns
    }

    /// Get patterns by domain.
    #[must_use]
    pub fn get_by_domain(&self, domain: PatternDomain) -> Vec<&PatternEntry> {
        self.patterns
            .iter()
            .filter(|p| p.domain == Some(domain))
            .collect()
    }

    /// Distinct labels produced by the registered patterns, in order of
    /// registration.
    #[must_use]
    pub fn supported_labels(&self) -> Vec<EntityLabel> {
        let mut labels: Vec<EntityLabel> = Vec::new();
        for entry in &self.patterns {
            if !labels.contains(&entry.label) {
                labels.push(entry.label.clone());
            }
        }
        labels
    }

    /// Get pattern count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Compile every pattern into a pipeline component.
    ///
    /// # Errors
    ///
    /// Returns the first compilation failure.
    pub fn components(&self) -> Result<Vec<CustomComponent>> {
        self.patterns.iter().map(PatternEntry::to_component).collect()
    }
}

/// Labels of every pre-built pattern across all domains.
#[must_use]
pub fn catalog_labels() -> Vec<EntityLabel> {
    PatternRegistry::new().with_all().supported_labels()
}

fn entry(label: EntityLabel, domain: PatternDomain, pattern: &str, description: &str) -> PatternEntry {
    PatternEntry::new(label, pattern)
        .with_domain(domain)
        .with_description(description)
}

fn builtin_entries(domain: PatternDomain) -> Vec<PatternEntry> {
    use EntityLabel as L;
    use PatternDomain as D;

    match domain {
        D::Healthcare => vec![
            entry(L::Ssn, D::Healthcare, r"\b\d{3}-\d{2}-\d{4}\b", "US Social Security Number"),
            entry(L::Mrn, D::Healthcare, r"\b(?:MRN:?\s*)?\d{6,10}\b", "Medical Record Number"),
            entry(L::Npi, D::Healthcare, r"\b\d{10}\b", "National Provider Identifier").not_followed_by("-"),
            entry(L::DeaNumber, D::Healthcare, r"\b[A-Z]{2}\d{7}\b", "DEA registration number"),
            entry(L::IcdCode, D::Healthcare, r"\b[A-Z]\d{2}\.?\d{0,3}\b", "ICD-10 diagnosis code"),
            entry(L::TrialId, D::Healthcare, r"\bNCT\d{8}\b", "ClinicalTrials.gov identifier"),
        ],
        D::Research => vec![
            entry(L::ParticipantId, D::Research, r"\bP[-_]?\d{4}[-_]?\d{3}\b", "Study participant identifier"),
            entry(L::StudyId, D::Research, r"\b(?:Study\s*ID\s*)?\d{4}-[A-Z]-\d{3}\b", "Study identifier"),
            entry(L::IrbNumber, D::Research, r"#?\d{4}-[A-Z]{3}-\d{3}\b", "IRB protocol number"),
            entry(L::InterviewTimestamp, D::Research, r"\[\d{2}:\d{2}\]", "Interview transcript timestamp"),
        ],
        D::Legal => vec![
            entry(L::CaseNumber, D::Legal, r"\b\d{4}-[A-Z]{2}-\d{4,6}\b", "Court case number"),
            entry(
                L::BarNumber,
                D::Legal,
                r"\b(?:Bar No\.|State Bar No:?)\s*[A-Z]{2}-?\d{5,6}\b",
                "State bar number",
            ),
            entry(
                L::LegalCitation,
                D::Legal,
                r"\b\d+\s+(?:U\.S\.C\.|C\.F\.R\.)\s+§?\s*\d+[a-z]?(?:\.\d+)?(?:\([a-z]\))?",
                "US Code or CFR citation",
            ),
        ],
        D::Financial => vec![
            entry(
                L::CreditCard,
                D::Financial,
                r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b",
                "Payment card number",
            ),
            entry(L::SwiftCode, D::Financial, r"\b[A-Z]{6}[A-Z0-9]{2}(?:[A-Z0-9]{3})?\b", "SWIFT/BIC code"),
            entry(L::RoutingNumber, D::Financial, r"\b\d{9}\b", "ABA routing number").not_followed_by("-"),
            entry(
                L::BitcoinAddress,
                D::Financial,
                r"\b(?:bc1|[13])[a-zA-HJ-NP-Z0-9]{25,62}\b",
                "Bitcoin address",
            ),
            entry(L::EthereumAddress, D::Financial, r"\b0x[a-fA-F0-9]{40}\b", "Ethereum address"),
        ],
        D::Hr => vec![
            entry(L::EmployeeId, D::Hr, r"\b(?:EMP-|EMPLOYEE\s*ID:?\s*)\d{5,8}\b", "Employee identifier"),
            entry(L::Salary, D::Hr, r"\$\d{1,3}(?:,\d{3})*(?:\.\d{2})?[kKmM]?\b", "Salary amount"),
            entry(L::DepartmentCode, D::Hr, r"\b(?:DEPT|Department)[-_]?[A-Z]{2,4}\b", "Department code"),
            entry(
                L::LinkedinUrl,
                D::Hr,
                r"(?:https?://)?(?:www\.)?linkedin\.com/in/[\w-]+",
                "LinkedIn profile URL",
            ),
        ],
        D::Support => vec![
            entry(L::TicketNumber, D::Support, r"#\d{4}-\d{2}-\d{2}-\d{4}\b", "Support ticket number"),
            entry(L::OrderNumber, D::Support, r"\b(?:ORD|ORDER)[-_]?\d{4}[-_]?\d{4,6}\b", "Order number"),
            entry(L::CustomerId, D::Support, r"\b(?:CUST|Customer\s*ID:?\s*)\d{6,10}\b", "Customer identifier"),
            entry(L::SocialMediaHandle, D::Support, r"@[a-zA-Z0-9_]{1,15}\b", "Social media handle"),
        ],
        D::Education => vec![
            entry(L::StudentId, D::Education, r"\b[A-Z]{2,3}-\d{4}-\d{4}\b", "Student identifier"),
            entry(L::CourseCode, D::Education, r"\b[A-Z]{2,4}\s?\d{3}[A-Z]?\b", "Course code"),
            entry(L::Gpa, D::Education, r"\b\d\.\d{1,2}(?:/4\.0)?\b", "Grade point average"),
        ],
        D::Government => vec![
            entry(L::Passport, D::Government, r"\b[A-Z]\d{8}\b", "Passport number"),
            entry(L::DriverLicense, D::Government, r"\b[A-Z]{1,2}\d{6,8}\b", "Driver license number"),
            entry(L::Vin, D::Government, r"\b[A-HJ-NPR-Z0-9]{17}\b", "Vehicle identification number"),
            entry(
                L::LicensePlate,
                D::Government,
                r"\b[A-Z]{2,3}[- ]?\d{3,4}[- ]?[A-Z]{0,2}\b",
                "License plate",
            ),
            entry(L::Ein, D::Government, r"\b\d{2}-\d{7}\b", "Employer Identification Number"),
        ],
        D::Technology => vec![
            entry(
                L::Uuid,
                D::Technology,
                r"(?i)\b[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}\b",
                "UUID",
            ),
            entry(
                L::ApiKey,
                D::Technology,
                r#"(?i)\b(?:api[_-]?key|apikey|access[_-]?token)\s*[:=]\s*['"]?[a-zA-Z0-9]{32,}['"]?"#,
                "API key assignment",
            ),
            entry(
                L::MacAddress,
                D::Technology,
                r"\b(?:[0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}\b",
                "MAC address",
            ),
            entry(L::BadgeNumber, D::Technology, r"\bBadge\s*#?\s*\d{3,6}\b", "Badge number"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn every_builtin_pattern_compiles() {
        let registry = PatternRegistry::new().with_all();
        for entry in registry.patterns() {
            assert!(
                Regex::new(&entry.pattern).is_ok(),
                "{} pattern failed to compile",
                entry.label
            );
        }
        assert!(registry.components().is_ok());
    }

    #[test]
    fn domain_is_added_once() {
        let once = PatternRegistry::new().with_domain(PatternDomain::Legal);
        let twice = once.clone().with_domain(PatternDomain::Legal);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn domain_roundtrip() {
        for domain in PatternDomain::ALL {
            assert_eq!(domain.as_str().parse::<PatternDomain>().unwrap(), domain);
        }
        assert!("astrology".parse::<PatternDomain>().is_err());
        assert_eq!(" HR ".parse::<PatternDomain>().unwrap(), PatternDomain::Hr);
    }

    #[test]
    fn catalog_covers_domain_labels() {
        let labels = catalog_labels();
        assert!(labels.contains(&EntityLabel::Ssn));
        assert!(labels.contains(&EntityLabel::BadgeNumber));
        assert!(labels.contains(&EntityLabel::EthereumAddress));
        assert_eq!(labels.len(), 38);
    }

    #[test]
    fn entries_use_label_priority() {
        let registry = PatternRegistry::new().with_domain(PatternDomain::Healthcare);
        let ssn = registry
            .patterns()
            .iter()
            .find(|p| p.label == EntityLabel::Ssn)
            .unwrap();
        assert_eq!(ssn.priority, 9);
    }

    #[test]
    fn grouped_numbers_stay_on_one_line() {
        let registry = PatternRegistry::new().with_all();
        for label in [EntityLabel::CreditCard, EntityLabel::LicensePlate] {
            let entry = registry.patterns().iter().find(|p| p.label == label).unwrap();
            let re = regex::Regex::new(&entry.pattern).unwrap();
            assert!(!re.is_match("4111 1111 1111\n1111 AB\n123"), "{label}");
        }
        let card = registry
            .patterns()
            .iter()
            .find(|p| p.label == EntityLabel::CreditCard)
            .unwrap();
        assert!(regex::Regex::new(&card.pattern).unwrap().is_match("4111 1111-1111 1111"));
    }

    #[test]
    fn custom_entry() {
        let label = EntityLabel::custom("PROJECT_CODE").unwrap();
        let registry = PatternRegistry::new().add(PatternEntry::new(label.clone(), r"PROJ-[A-Z]{4}"));
        assert_eq!(registry.supported_labels(), vec![label]);
        assert!(registry.get_by_domain(PatternDomain::Legal).is_empty());
    }
}

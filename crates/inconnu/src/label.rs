//! Entity labels.
//!
//! Every label carries a fixed priority weight used to break ties during
//! conflict resolution, and renders as the uppercase tag that appears inside
//! placeholder tokens. Locale-specific tags produced by NER backends (for
//! example the German `PER`) are folded into their canonical form on parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InconnuError, Result};

/// Priority given to user-defined labels.
pub const CUSTOM_LABEL_PRIORITY: i32 = 5;

/// A user-defined label name.
///
/// Guaranteed to match `[A-Z_]+` so it can be embedded in a placeholder,
/// and never to spell a built-in tag or one of its aliases, so a custom
/// label cannot share placeholder numbering with a built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomLabel(String);

impl CustomLabel {
    /// Create a custom label, validating the placeholder grammar.
    ///
    /// # Errors
    ///
    /// Returns an invalid-label error if `name` is outside `[A-Z_]+` or
    /// names a built-in label.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if is_label_name(&name) && EntityLabel::builtin(&name).is_none() {
            Ok(Self(name))
        } else {
            Err(InconnuError::invalid_label(name))
        }
    }

    /// Get the label name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check that a name is usable inside a placeholder token.
fn is_label_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_uppercase() || b == b'_')
}

/// Type of entity a span refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityLabel {
    /// Person name.
    Person,
    /// Organization.
    Org,
    /// Geopolitical entity (country, city, state).
    Gpe,
    /// Non-GPE location.
    Loc,
    /// Facility (building, airport, bridge).
    Fac,
    /// Nationality, religious or political group.
    Norp,
    /// Date expression.
    Date,
    /// Time expression.
    Time,
    /// Named event.
    Event,
    /// Product name.
    Product,
    /// Named law or document.
    Law,
    /// Named language.
    Language,
    /// Title of a creative work.
    WorkOfArt,
    /// Miscellaneous entity.
    Misc,
    /// Bare number.
    Cardinal,
    /// Ordinal number.
    Ordinal,
    /// Measurement.
    Quantity,
    /// Percentage.
    Percent,
    /// Monetary value.
    Money,
    /// Email address.
    Email,
    /// Phone number.
    PhoneNumber,
    /// International Bank Account Number.
    Iban,
    /// US Social Security Number.
    Ssn,
    /// Medical record number.
    Mrn,
    /// National Provider Identifier.
    Npi,
    /// DEA registration number.
    DeaNumber,
    /// ICD diagnosis code.
    IcdCode,
    /// Clinical trial identifier.
    TrialId,
    /// Research participant identifier.
    ParticipantId,
    /// Study identifier.
    StudyId,
    /// Institutional review board number.
    IrbNumber,
    /// Interview timestamp marker.
    InterviewTimestamp,
    /// Court case number.
    CaseNumber,
    /// Bar admission number.
    BarNumber,
    /// Legal citation.
    LegalCitation,
    /// Credit card number.
    CreditCard,
    /// SWIFT/BIC code.
    SwiftCode,
    /// US bank routing number.
    RoutingNumber,
    /// Bitcoin address.
    BitcoinAddress,
    /// Ethereum address.
    EthereumAddress,
    /// Employee identifier.
    EmployeeId,
    /// Salary figure.
    Salary,
    /// Department code.
    DepartmentCode,
    /// `LinkedIn` profile URL.
    LinkedinUrl,
    /// Support ticket number.
    TicketNumber,
    /// Order number.
    OrderNumber,
    /// Customer identifier.
    CustomerId,
    /// Social media handle.
    SocialMediaHandle,
    /// Student identifier.
    StudentId,
    /// Course code.
    CourseCode,
    /// Grade point average.
    Gpa,
    /// Passport number.
    Passport,
    /// Driver's license number.
    DriverLicense,
    /// Vehicle identification number.
    Vin,
    /// License plate.
    LicensePlate,
    /// Employer identification number.
    Ein,
    /// UUID.
    Uuid,
    /// API key or access token.
    ApiKey,
    /// MAC address.
    MacAddress,
    /// Badge number.
    BadgeNumber,
    /// User-defined label.
    Custom(CustomLabel),
}

impl EntityLabel {
    /// All built-in labels.
    pub const BUILTIN: &'static [Self] = &[
        Self::Person,
        Self::Org,
        Self::Gpe,
        Self::Loc,
        Self::Fac,
        Self::Norp,
        Self::Date,
        Self::Time,
        Self::Event,
        Self::Product,
        Self::Law,
        Self::Language,
        Self::WorkOfArt,
        Self::Misc,
        Self::Cardinal,
        Self::Ordinal,
        Self::Quantity,
        Self::Percent,
        Self::Money,
        Self::Email,
        Self::PhoneNumber,
        Self::Iban,
        Self::Ssn,
        Self::Mrn,
        Self::Npi,
        Self::DeaNumber,
        Self::IcdCode,
        Self::TrialId,
        Self::ParticipantId,
        Self::StudyId,
        Self::IrbNumber,
        Self::InterviewTimestamp,
        Self::CaseNumber,
        Self::BarNumber,
        Self::LegalCitation,
        Self::CreditCard,
        Self::SwiftCode,
        Self::RoutingNumber,
        Self::BitcoinAddress,
        Self::EthereumAddress,
        Self::EmployeeId,
        Self::Salary,
        Self::DepartmentCode,
        Self::LinkedinUrl,
        Self::TicketNumber,
        Self::OrderNumber,
        Self::CustomerId,
        Self::SocialMediaHandle,
        Self::StudentId,
        Self::CourseCode,
        Self::Gpa,
        Self::Passport,
        Self::DriverLicense,
        Self::Vin,
        Self::LicensePlate,
        Self::Ein,
        Self::Uuid,
        Self::ApiKey,
        Self::MacAddress,
        Self::BadgeNumber,
    ];

    /// Create a user-defined label.
    ///
    /// A name that spells a built-in tag or alias (`PERSON`, `PER`,
    /// `EMAIL_ADDRESS`) yields the built-in label instead.
    ///
    /// # Errors
    ///
    /// Returns an invalid-label error if `name` is outside `[A-Z_]+`.
    pub fn custom(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if !is_label_name(&name) {
            return Err(InconnuError::invalid_label(name));
        }
        match Self::builtin(&name) {
            Some(label) => Ok(label),
            None => Ok(Self::Custom(CustomLabel(name))),
        }
    }

    /// Look up the built-in label for an uppercase tag, folding aliases.
    fn builtin(tag: &str) -> Option<Self> {
        let canonical = match tag {
            "PER" | "PERS" => "PERSON",
            "ORGANIZATION" | "ORGANISATION" => "ORG",
            "LOCATION" => "LOC",
            "EMAIL_ADDRESS" => "EMAIL",
            "PHONE" | "TELEPHONE" => "PHONE_NUMBER",
            "US_SSN" => "SSN",
            "CREDIT_CARD_NUMBER" => "CREDIT_CARD",
            other => other,
        };
        Self::BUILTIN.iter().find(|l| l.as_str() == canonical).cloned()
    }

    /// The canonical tag used inside placeholders.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Loc => "LOC",
            Self::Fac => "FAC",
            Self::Norp => "NORP",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Event => "EVENT",
            Self::Product => "PRODUCT",
            Self::Law => "LAW",
            Self::Language => "LANGUAGE",
            Self::WorkOfArt => "WORK_OF_ART",
            Self::Misc => "MISC",
            Self::Cardinal => "CARDINAL",
            Self::Ordinal => "ORDINAL",
            Self::Quantity => "QUANTITY",
            Self::Percent => "PERCENT",
            Self::Money => "MONEY",
            Self::Email => "EMAIL",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Iban => "IBAN",
            Self::Ssn => "SSN",
            Self::Mrn => "MRN",
            Self::Npi => "NPI",
            Self::DeaNumber => "DEA_NUMBER",
            Self::IcdCode => "ICD_CODE",
            Self::TrialId => "TRIAL_ID",
            Self::ParticipantId => "PARTICIPANT_ID",
            Self::StudyId => "STUDY_ID",
            Self::IrbNumber => "IRB_NUMBER",
            Self::InterviewTimestamp => "INTERVIEW_TIMESTAMP",
            Self::CaseNumber => "CASE_NUMBER",
            Self::BarNumber => "BAR_NUMBER",
            Self::LegalCitation => "LEGAL_CITATION",
            Self::CreditCard => "CREDIT_CARD",
            Self::SwiftCode => "SWIFT_CODE",
            Self::RoutingNumber => "ROUTING_NUMBER",
            Self::BitcoinAddress => "BITCOIN_ADDRESS",
            Self::EthereumAddress => "ETHEREUM_ADDRESS",
            Self::EmployeeId => "EMPLOYEE_ID",
            Self::Salary => "SALARY",
            Self::DepartmentCode => "DEPARTMENT_CODE",
            Self::LinkedinUrl => "LINKEDIN_URL",
            Self::TicketNumber => "TICKET_NUMBER",
            Self::OrderNumber => "ORDER_NUMBER",
            Self::CustomerId => "CUSTOMER_ID",
            Self::SocialMediaHandle => "SOCIAL_MEDIA_HANDLE",
            Self::StudentId => "STUDENT_ID",
            Self::CourseCode => "COURSE_CODE",
            Self::Gpa => "GPA",
            Self::Passport => "PASSPORT",
            Self::DriverLicense => "DRIVER_LICENSE",
            Self::Vin => "VIN",
            Self::LicensePlate => "LICENSE_PLATE",
            Self::Ein => "EIN",
            Self::Uuid => "UUID",
            Self::ApiKey => "API_KEY",
            Self::MacAddress => "MAC_ADDRESS",
            Self::BadgeNumber => "BADGE_NUMBER",
            Self::Custom(custom) => custom.as_str(),
        }
    }

    /// Tie-breaking weight; higher wins when spans compete for the same text.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        match self {
            Self::Email | Self::Iban | Self::Ssn => 9,
            Self::Person
            | Self::PhoneNumber
            | Self::Mrn
            | Self::Npi
            | Self::DeaNumber
            | Self::CreditCard
            | Self::Passport
            | Self::DriverLicense
            | Self::ApiKey
            | Self::BadgeNumber => 8,
            Self::CaseNumber
            | Self::BarNumber
            | Self::SwiftCode
            | Self::RoutingNumber
            | Self::TicketNumber
            | Self::Vin
            | Self::Ein => 7,
            Self::Org
            | Self::IcdCode
            | Self::TrialId
            | Self::ParticipantId
            | Self::StudyId
            | Self::IrbNumber
            | Self::LegalCitation
            | Self::BitcoinAddress
            | Self::EthereumAddress
            | Self::EmployeeId
            | Self::LinkedinUrl
            | Self::OrderNumber
            | Self::StudentId
            | Self::LicensePlate
            | Self::Uuid
            | Self::MacAddress => 6,
            Self::Gpe
            | Self::Loc
            | Self::InterviewTimestamp
            | Self::Salary
            | Self::DepartmentCode
            | Self::CustomerId
            | Self::SocialMediaHandle => 5,
            Self::Fac | Self::Date | Self::CourseCode | Self::Gpa => 4,
            Self::Norp | Self::Time | Self::Event | Self::Product | Self::Law => 3,
            Self::Language | Self::WorkOfArt | Self::Money => 2,
            Self::Misc => 1,
            Self::Cardinal | Self::Ordinal | Self::Quantity | Self::Percent => 0,
            Self::Custom(_) => CUSTOM_LABEL_PRIORITY,
        }
    }

    /// Check if this is a user-defined label.
    #[must_use]
    pub const fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Parse a tag, folding locale and legacy variants into canonical labels.
    ///
    /// Unknown tags that satisfy the placeholder grammar become custom labels.
    pub fn parse(tag: &str) -> Result<Self> {
        let upper = tag.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::custom(upper)
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityLabel {
    type Err = InconnuError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityLabel {
    type Error = InconnuError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityLabel> for String {
    fn from(label: EntityLabel) -> Self {
        label.as_str().to_string()
    }
}

//! inconnu: reversible redaction of sensitive entities in text
//!
//! This crate finds sensitive entities in free text, replaces them with
//! placeholder tokens and restores the original values later, even after the
//! redacted text has been rewritten by another system.
//!
//! # Features
//!
//! - **Pluggable detection**: any [`SpanProvider`] (an NER model, a rule
//!   engine) plus regex and producer [`CustomComponent`]s
//! - **Deterministic conflict resolution** over overlapping spans
//! - **Structural validators** (Luhn, mod-97, ABA, DEA...) that weed out
//!   pattern false positives
//! - **Position-exact restoration** with a scanning fallback and detection of
//!   invented placeholders
//! - **Streaming and batch** entry points, including async batches on the
//!   tokio blocking pool
//!
//! # Example
//!
//! ```rust
//! use inconnu::prelude::*;
//!
//! let engine = Inconnu::builder()
//!     .provider(KeywordProvider::new().with_term(EntityLabel::Person, "Ada Lovelace"))
//!     .build()?;
//!
//! let result = engine.process("Ada Lovelace, ada@example.org", true)?;
//! assert_eq!(result.redacted_text, "[PERSON_0], [EMAIL_0]");
//! assert_eq!(engine.deanonymize(&result), "Ada Lovelace, ada@example.org");
//! # Ok::<(), InconnuError>(())
//! ```

pub mod cache;
pub mod chunker;
pub mod config;
pub mod engine;
pub mod error;
pub mod label;
pub mod patterns;
pub mod placeholder;
pub mod prelude;
pub mod provider;
pub mod redaction;
pub mod resolver;
pub mod restore;
pub mod result;
pub mod span;
pub mod validators;

pub use cache::{CacheStats, ProviderCache, SharedProvider};
pub use chunker::StreamChunker;
pub use config::Config;
pub use engine::{EngineStats, Inconnu, InconnuBuilder};
pub use error::{InconnuError, ProviderError, Result};
pub use label::{CustomLabel, EntityLabel};
pub use patterns::{PatternDomain, PatternEntry, PatternRegistry};
pub use placeholder::PLACEHOLDER_PATTERN;
pub use provider::{
    CustomComponent, FnProvider, KeywordProvider, NoopProvider, SpanProvider, Stage,
};
pub use redaction::{EntityMap, PositionMap, Redaction, Redactor};
pub use resolver::ConflictResolver;
pub use restore::{RestoreReport, RestoreStrategy, Restorer};
pub use result::ProcessedResult;
pub use span::{EntitySpan, SpanCandidate, SpanValidation, TextRange, validate_spans};
pub use validators::{ValidatorRegistry, Verdict};

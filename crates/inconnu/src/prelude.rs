//! Convenient re-exports for common inconnu usage.
//!
//! # Example
//!
//! ```rust
//! use inconnu::prelude::*;
//!
//! let engine = Inconnu::new()?;
//! assert_eq!(engine.redact("mail me at bob@example.com")?, "mail me at [EMAIL]");
//! # Ok::<(), InconnuError>(())
//! ```

// Engine
pub use crate::config::Config;
pub use crate::engine::{Inconnu, InconnuBuilder};
pub use crate::result::ProcessedResult;

// Error handling
pub use crate::error::{InconnuError, Result};

// Detection
pub use crate::label::EntityLabel;
pub use crate::patterns::{PatternDomain, PatternRegistry};
pub use crate::provider::{CustomComponent, FnProvider, KeywordProvider, SpanProvider, Stage};
pub use crate::span::{EntitySpan, SpanCandidate};

// Redaction and restore
pub use crate::redaction::{EntityMap, PositionMap};
pub use crate::restore::{RestoreReport, RestoreStrategy};

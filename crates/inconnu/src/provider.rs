//! Span providers and pipeline components.
//!
//! A [`SpanProvider`] turns text into raw [`SpanCandidate`]s. The
//! statistical NER backend is one provider; [`CustomComponent`]s wrap either
//! a regex or another provider and run before or after it.
//!
//! # Example
//!
//! ```rust
//! use inconnu::label::EntityLabel;
//! use inconnu::provider::{CustomComponent, KeywordProvider, SpanProvider};
//!
//! let ner = KeywordProvider::new().with_term(EntityLabel::Person, "John Doe");
//! let spans = ner.detect("Ask John Doe.").unwrap();
//! assert_eq!(spans.len(), 1);
//!
//! let staff = CustomComponent::pattern(EntityLabel::custom("STAFF_ID").unwrap(), r"STF-\d{6}")
//!     .unwrap()
//!     .with_priority(8);
//! assert_eq!(staff.detect("id STF-123456").unwrap().len(), 1);
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{InconnuError, ProviderError, Result};
use crate::label::EntityLabel;
use crate::patterns::{EMAIL_PATTERN, IBAN_PATTERN, PHONE_NUMBER_PATTERN};
use crate::span::{EntitySpan, SpanCandidate};

/// Titles folded into an adjacent PERSON span.
pub const PERSON_TITLES: [&str; 10] = ["Dr", "Dr.", "Mr", "Mr.", "Ms", "Ms.", "Mrs", "Mrs.", "Prof", "Prof."];

/// Something that finds candidate entities in text.
pub trait SpanProvider: Send + Sync {
    /// Detect candidate spans in `text`.
    ///
    /// # Errors
    ///
    /// Implementations return an error when detection itself fails. The
    /// pipeline surfaces it as [`InconnuError::Processing`].
    fn detect(&self, text: &str) -> std::result::Result<Vec<SpanCandidate>, ProviderError>;

    /// Short name used in logs and error messages.
    fn name(&self) -> &str {
        "provider"
    }
}

impl<P: SpanProvider + ?Sized> SpanProvider for Arc<P> {
    fn detect(&self, text: &str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> {
        (**self).detect(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A provider that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvider;

impl SpanProvider for NoopProvider {
    fn detect(&self, _text: &str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Adapts a closure into a provider.
pub struct FnProvider<F> {
    name: String,
    func: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> + Send + Sync,
{
    /// Wrap `func` under the given name.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<F> SpanProvider for FnProvider<F>
where
    F: Fn(&str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> + Send + Sync,
{
    fn detect(&self, text: &str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> {
        (self.func)(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Dictionary provider: reports every occurrence of known terms.
///
/// Terms match on word boundaries. Within a label, longer terms win over
/// shorter terms starting at the same offset.
#[derive(Debug, Clone, Default)]
pub struct KeywordProvider {
    terms: Vec<(EntityLabel, String)>,
    case_insensitive: bool,
    matchers: OnceLock<Vec<(EntityLabel, Regex)>>,
}

impl KeywordProvider {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match terms regardless of case.
    #[must_use]
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self.matchers = OnceLock::new();
        self
    }

    /// Add a term. Blank terms are ignored.
    #[must_use]
    pub fn with_term(mut self, label: EntityLabel, term: impl Into<String>) -> Self {
        let term = term.into();
        if !term.trim().is_empty() {
            self.terms.push((label, term));
            self.matchers = OnceLock::new();
        }
        self
    }

    /// Add several terms under one label.
    #[must_use]
    pub fn with_terms<I, S>(self, label: &EntityLabel, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        terms
            .into_iter()
            .fold(self, |provider, term| provider.with_term(label.clone(), term))
    }

    /// Number of registered terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if no terms are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn compile(&self) -> std::result::Result<Vec<(EntityLabel, Regex)>, regex::Error> {
        let mut grouped: Vec<(EntityLabel, Vec<&str>)> = Vec::new();
        for (label, term) in &self.terms {
            match grouped.iter_mut().find(|(l, _)| l == label) {
                Some((_, terms)) => terms.push(term.as_str()),
                None => grouped.push((label.clone(), vec![term.as_str()])),
            }
        }

        grouped
            .into_iter()
            .map(|(label, mut terms)| {
                terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
                terms.dedup();
                let alternation = terms
                    .iter()
                    .map(|term| bounded(term))
                    .collect::<Vec<_>>()
                    .join("|");
                let flags = if self.case_insensitive { "(?i)" } else { "" };
                Regex::new(&format!("{flags}(?:{alternation})")).map(|re| (label, re))
            })
            .collect()
    }
}

/// Escape a term and anchor it on word boundaries where it starts or ends
/// with a word character.
fn bounded(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.chars().next().is_some_and(is_word) { r"\b" } else { "" };
    let trail = if term.chars().last().is_some_and(is_word) { r"\b" } else { "" };
    format!("{lead}{}{trail}", regex::escape(term))
}

impl SpanProvider for KeywordProvider {
    fn detect(&self, text: &str) -> std::result::Result<Vec<SpanCandidate>, ProviderError> {
        let matchers = match self.matchers.get() {
            Some(matchers) => matchers,
            None => {
                let built = self.compile()?;
                self.matchers.get_or_init(|| built)
            }
        };

        Ok(matchers
            .iter()
            .flat_map(|(label, re)| {
                re.find_iter(text)
                    .map(|m| SpanCandidate::from_range(label.clone(), m.start(), m.end()))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "keywords"
    }
}

/// Where a component runs relative to the NER backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    /// Runs first; its spans pin their ranges against NER output.
    #[default]
    BeforeNer,
    /// Runs after NER and competes with it in ordinary resolution.
    AfterNer,
}

/// How a component finds spans.
#[derive(Clone)]
pub enum ComponentKind {
    /// Every match of a regex.
    Pattern(Regex),
    /// A span producer.
    Producer(Arc<dyn SpanProvider>),
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Self::Producer(p) => f.debug_tuple("Producer").field(&p.name()).finish(),
        }
    }
}

/// A user-supplied detection step.
#[derive(Debug, Clone)]
pub struct CustomComponent {
    label: EntityLabel,
    kind: ComponentKind,
    stage: Stage,
    priority: Option<i32>,
    trailing_guard: Vec<char>,
}

impl CustomComponent {
    /// Create a regex component labeling every match with `label`.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::InvalidComponent`] if the pattern does not
    /// compile or can match the empty string.
    pub fn pattern(label: EntityLabel, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            InconnuError::invalid_component(format!("{label} pattern does not compile: {e}"))
        })?;
        Self::from_regex(label, regex)
    }

    /// Create a regex component from a compiled regex.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::InvalidComponent`] if the regex matches the
    /// empty string.
    pub fn from_regex(label: EntityLabel, regex: Regex) -> Result<Self> {
        if regex.is_match("") {
            return Err(InconnuError::invalid_component(format!(
                "{label} pattern '{}' matches the empty string",
                regex.as_str()
            )));
        }
        Ok(Self {
            label,
            kind: ComponentKind::Pattern(regex),
            stage: Stage::BeforeNer,
            priority: None,
            trailing_guard: Vec::new(),
        })
    }

    /// Create a component backed by a span producer.
    ///
    /// Spans keep the labels the producer assigns; `label` names the
    /// component.
    pub fn producer(label: EntityLabel, provider: impl SpanProvider + 'static) -> Self {
        Self::from_arc(label, Arc::new(provider))
    }

    /// Create a component from a shared producer.
    #[must_use]
    pub fn from_arc(label: EntityLabel, provider: Arc<dyn SpanProvider>) -> Self {
        Self {
            label,
            kind: ComponentKind::Producer(provider),
            stage: Stage::BeforeNer,
            priority: None,
            trailing_guard: Vec::new(),
        }
    }

    /// Set the stage.
    #[must_use]
    pub const fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Run after the NER backend.
    #[must_use]
    pub const fn after_ner(self) -> Self {
        self.with_stage(Stage::AfterNer)
    }

    /// Priority assigned to spans that carry no hint of their own.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Drop regex matches directly followed by any of `chars`.
    #[must_use]
    pub fn with_trailing_guard(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.trailing_guard = chars.into_iter().collect();
        self
    }

    /// The component label.
    #[must_use]
    pub const fn label(&self) -> &EntityLabel {
        &self.label
    }

    /// The detection mechanism.
    #[must_use]
    pub const fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// The stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// The priority override, if any.
    #[must_use]
    pub const fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// Run the component.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::Processing`] if a producer fails.
    pub fn detect(&self, text: &str) -> Result<Vec<SpanCandidate>> {
        let mut candidates = match &self.kind {
            ComponentKind::Pattern(re) => re
                .find_iter(text)
                .filter(|m| {
                    text[m.end()..]
                        .chars()
                        .next()
                        .is_none_or(|next| !self.trailing_guard.contains(&next))
                })
                .map(|m| SpanCandidate::from_range(self.label.clone(), m.start(), m.end()))
                .collect(),
            ComponentKind::Producer(provider) => provider.detect(text).map_err(|e| {
                InconnuError::processing(
                    format!("component {} ({}) failed", self.label, provider.name()),
                    e,
                )
            })?,
        };

        if let Some(priority) = self.priority {
            for candidate in &mut candidates {
                candidate.source_priority.get_or_insert(priority);
            }
        }
        Ok(candidates)
    }

    fn same_definition(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ComponentKind::Pattern(a), ComponentKind::Pattern(b)) => {
                self.label == other.label && a.as_str() == b.as_str()
            }
            (ComponentKind::Producer(a), ComponentKind::Producer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// The components every pipeline starts with: email, IBAN and phone
/// patterns, all ahead of NER.
///
/// # Errors
///
/// Never fails in practice; the patterns are fixed.
pub fn default_components() -> Result<Vec<CustomComponent>> {
    Ok(vec![
        CustomComponent::pattern(EntityLabel::PhoneNumber, PHONE_NUMBER_PATTERN)?,
        CustomComponent::pattern(EntityLabel::Email, EMAIL_PATTERN)?,
        CustomComponent::pattern(EntityLabel::Iban, IBAN_PATTERN)?,
    ])
}

/// Describe likely mistakes in a component list.
///
/// Components are valid by construction; this reports configurations that
/// are legal but probably unintended.
#[must_use]
pub fn component_problems(components: &[CustomComponent], excluded: &[EntityLabel]) -> Vec<String> {
    let mut problems = Vec::new();

    for (i, component) in components.iter().enumerate() {
        if excluded.contains(component.label()) {
            problems.push(format!(
                "Component {i} ({}) produces an excluded label; its spans will never be redacted",
                component.label()
            ));
        }
        if let Some(priority) = component.priority().filter(|p| *p < 0) {
            problems.push(format!(
                "Component {i} ({}) has negative priority {priority}; it loses every conflict",
                component.label()
            ));
        }
        if components[..i].iter().any(|earlier| earlier.same_definition(component)) {
            problems.push(format!("Component {i} ({}) duplicates an earlier component", component.label()));
        }
    }

    problems
}

/// Widen PERSON spans to include a directly preceding title such as `Dr.`.
///
/// The title must be the last word before the span on the same line. Spans
/// at the start of the document are left alone.
#[must_use]
pub fn extend_person_titles(text: &str, spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    spans
        .into_iter()
        .map(|span| {
            if span.label() != &EntityLabel::Person || span.start() == 0 {
                return span;
            }
            match title_start(&text[..span.start()]) {
                Some(start) => EntitySpan::new(EntityLabel::Person, start, span.end(), text)
                    .map_or(span.clone(), |widened| widened.with_priority(span.source_priority())),
                None => span,
            }
        })
        .collect()
}

/// Offset of a title ending `prefix`, separated from its end by horizontal
/// whitespace only.
fn title_start(prefix: &str) -> Option<usize> {
    let trimmed = prefix.trim_end_matches([' ', '\t']);
    if trimmed.len() == prefix.len() {
        return None;
    }
    let word_start = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = &trimmed[word_start..];
    PERSON_TITLES.contains(&word).then_some(word_start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::validate_spans;

    #[test]
    fn keyword_provider_finds_all_occurrences() {
        let provider = KeywordProvider::new().with_term(EntityLabel::Person, "Ann");
        let spans = provider.detect("Ann and Ann, not Annabel").unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[1].start, spans[1].end), (8, 11));
    }

    #[test]
    fn keyword_provider_prefers_longer_terms() {
        let provider = KeywordProvider::new()
            .with_term(EntityLabel::Person, "John")
            .with_term(EntityLabel::Person, "John Smith");
        let spans = provider.detect("John Smith").unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].end, 10);
    }

    #[test]
    fn keyword_provider_case_insensitive() {
        let provider = KeywordProvider::new()
            .with_term(EntityLabel::Org, "acme")
            .case_insensitive(true);
        assert_eq!(provider.detect("ACME Corp").unwrap().len(), 1);
    }

    #[test]
    fn fn_provider_error_is_wrapped() {
        let failing = FnProvider::new("broken", |_: &str| Err("model unavailable".into()));
        let component = CustomComponent::producer(EntityLabel::Person, failing);
        let err = component.detect("text").unwrap_err();
        assert!(err.is_processing());
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn pattern_component_rejects_empty_match() {
        let err = CustomComponent::pattern(EntityLabel::Misc, r"\d*").unwrap_err();
        assert!(matches!(err, InconnuError::InvalidComponent { .. }));
        assert!(CustomComponent::pattern(EntityLabel::Misc, "(").is_err());
    }

    #[test]
    fn trailing_guard_filters_matches() {
        let component = CustomComponent::pattern(EntityLabel::Npi, r"\b\d{10}\b")
            .unwrap()
            .with_trailing_guard(['-']);
        let spans = component.detect("1234567897 and 1234567897-1").unwrap();
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn component_priority_fills_missing_hints() {
        let provider = FnProvider::new("fixed", |_: &str| {
            Ok(vec![
                SpanCandidate::new(EntityLabel::Person, 0, 1),
                SpanCandidate::new(EntityLabel::Person, 2, 3).with_priority(1),
            ])
        });
        let component = CustomComponent::producer(EntityLabel::Person, provider).with_priority(7);
        let spans = component.detect("a b").unwrap();
        assert_eq!(spans[0].source_priority, Some(7));
        assert_eq!(spans[1].source_priority, Some(1));
    }

    #[test]
    fn default_components_detect_contacts() {
        let text = "Mail jane.doe@example.com or call +49 30 1234 5678, IBAN DE89370400440532013000";
        let labels: Vec<EntityLabel> = default_components()
            .unwrap()
            .iter()
            .flat_map(|c| c.detect(text).unwrap())
            .map(|c| c.label)
            .collect();
        assert!(labels.contains(&EntityLabel::Email));
        assert!(labels.contains(&EntityLabel::PhoneNumber));
        assert!(labels.contains(&EntityLabel::Iban));
    }

    #[test]
    fn titles_are_folded_into_person() {
        let text = "Ask Dr. Smith or Mr Jones";
        let candidates = vec![
            SpanCandidate::new(EntityLabel::Person, 8, 13),
            SpanCandidate::new(EntityLabel::Person, 20, 25),
        ];
        let spans = extend_person_titles(text, validate_spans(candidates, text).valid);
        assert_eq!(spans[0].text(), "Dr. Smith");
        assert_eq!(spans[1].text(), "Mr Jones");
    }

    #[test]
    fn title_on_previous_line_is_ignored() {
        let text = "Dr.\nSmith";
        let spans = validate_spans([SpanCandidate::new(EntityLabel::Person, 4, 9)], text).valid;
        let spans = extend_person_titles(text, spans);
        assert_eq!(spans[0].text(), "Smith");
    }

    #[test]
    fn problems_are_reported() {
        let email = CustomComponent::pattern(EntityLabel::Cardinal, r"\d+").unwrap();
        let dup = email.clone().with_priority(-1);
        let problems = component_problems(&[email, dup], &[EntityLabel::Cardinal]);
        assert_eq!(problems.len(), 4);
    }
}

//! The redaction engine.
//!
//! [`Inconnu`] wires the pipeline together:
//!
//! ```text
//! text -> components (before NER) ----------------------> pinned spans --+
//!      -> span provider + components (after NER) -> rest spans --------+-> resolver -> redactor
//! ```
//!
//! Every stage between detection and substitution is deterministic. A
//! detection failure fails the call; the engine never hands back the input
//! text in place of a redaction.
//!
//! # Example
//!
//! ```rust
//! use inconnu::label::EntityLabel;
//! use inconnu::provider::KeywordProvider;
//! use inconnu::Inconnu;
//!
//! let engine = Inconnu::builder()
//!     .provider(KeywordProvider::new().with_term(EntityLabel::Person, "John Doe"))
//!     .build()
//!     .unwrap();
//!
//! let (redacted, map) = engine.pseudonymize("John Doe wrote to jane@example.com").unwrap();
//! assert_eq!(redacted, "[PERSON_0] wrote to [EMAIL_0]");
//! assert_eq!(engine.restore(&redacted, &map), "John Doe wrote to jane@example.com");
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::try_join_all;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, ProviderCache, SharedProvider};
use crate::chunker::{StreamChunker, log_progress, run_in_groups};
use crate::config::Config;
use crate::error::{InconnuError, Result};
use crate::label::EntityLabel;
use crate::patterns::PatternRegistry;
use crate::provider::{
    CustomComponent, SpanProvider, Stage, component_problems, default_components,
    extend_person_titles,
};
use crate::redaction::{EntityMap, PositionMap, Redaction, Redactor};
use crate::resolver::ConflictResolver;
use crate::restore::{RestoreReport, Restorer};
use crate::result::{ProcessedResult, hash_text};
use crate::span::{EntitySpan, SpanCandidate, validate_spans};
use crate::validators::ValidatorRegistry;

type ProviderFactory = Box<dyn FnOnce() -> Result<SharedProvider> + Send>;

struct Inner {
    config: Config,
    provider: Option<SharedProvider>,
    components: Vec<CustomComponent>,
    registry: PatternRegistry,
    validators: ValidatorRegistry,
    resolver: ConflictResolver,
    redactor: Redactor,
    restorer: Restorer,
    chunker: StreamChunker,
    cache: Option<Arc<ProviderCache>>,
}

/// Entity redaction engine.
///
/// Cheap to clone; clones share the same pipeline.
#[derive(Clone)]
pub struct Inconnu {
    inner: Arc<Inner>,
}

impl fmt::Debug for Inconnu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inconnu")
            .field("config", &self.inner.config)
            .field(
                "provider",
                &self.inner.provider.as_ref().map(|p| p.name().to_string()),
            )
            .field("components", &self.inner.components.len())
            .finish_non_exhaustive()
    }
}

/// Engine statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    /// Provider cache key.
    pub language: String,
    /// Name of the NER provider, if any.
    pub provider: Option<String>,
    /// Number of pipeline components, defaults and catalog patterns included.
    pub components: usize,
    /// Number of catalog patterns enabled.
    pub patterns: usize,
    /// Number of labels with a structural validator.
    pub validators: usize,
    /// Provider cache statistics, when a cache is attached.
    pub cache: Option<CacheStats>,
}

impl Inconnu {
    /// Start building an engine.
    #[must_use]
    pub fn builder() -> InconnuBuilder {
        InconnuBuilder::new()
    }

    /// Build an engine with default settings and no NER provider.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Detect, validate and resolve entity spans in `text`.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::TextTooLong`] before any detection if `text`
    /// exceeds the configured maximum, and [`InconnuError::Processing`] if a
    /// provider or component fails.
    pub fn detect(&self, text: &str) -> Result<Vec<EntitySpan>> {
        self.check_length(text)?;
        let inner = &*self.inner;

        let mut pinned: Vec<SpanCandidate> = Vec::new();
        let mut rest: Vec<SpanCandidate> = Vec::new();

        for component in inner.components.iter().filter(|c| c.stage() == Stage::BeforeNer) {
            pinned.extend(component.detect(text)?);
        }
        if let Some(provider) = &inner.provider {
            let found = provider.detect(text).map_err(|e| {
                InconnuError::processing(format!("span provider {} failed", provider.name()), e)
            })?;
            rest.extend(found);
        }
        for component in inner.components.iter().filter(|c| c.stage() == Stage::AfterNer) {
            rest.extend(component.detect(text)?);
        }

        let pinned = self.accept(pinned, text);
        let mut rest = self.accept(rest, text);
        if inner.config.person_titles {
            rest = extend_person_titles(text, rest);
        }

        Ok(inner.resolver.resolve_layered(pinned, rest))
    }

    /// Drop malformed spans and spans failing their structural check.
    fn accept(&self, candidates: Vec<SpanCandidate>, text: &str) -> Vec<EntitySpan> {
        let checked = validate_spans(candidates, text);
        for reason in &checked.errors {
            debug!(reason = %reason, "Dropping invalid span");
        }
        if !self.inner.config.validate_structure {
            return checked.valid;
        }

        checked
            .valid
            .into_iter()
            .filter_map(|span| self.structural_fit(span, text))
            .collect()
    }

    /// Keep `span` if it passes its structural check, or else its longest
    /// prefix ending at a space or dash that does.
    ///
    /// Greedy patterns can run into a trailing word (`DE89 ... 00 EUR`);
    /// cutting back keeps the identifier redacted instead of dropping it.
    fn structural_fit(&self, span: EntitySpan, text: &str) -> Option<EntitySpan> {
        let validators = &self.inner.validators;
        if validators.validate(span.label(), span.text()).valid {
            return Some(span);
        }

        let cuts = span
            .text()
            .char_indices()
            .filter(|(_, c)| matches!(c, ' ' | '-'))
            .map(|(i, _)| i)
            .rev();
        for cut in cuts {
            let prefix = span.text()[..cut].trim_end_matches([' ', '-']);
            if prefix.is_empty() || !validators.validate(span.label(), prefix).valid {
                continue;
            }
            let end = span.start() + prefix.len();
            debug!(label = %span.label(), start = span.start(), end, "Trimmed span to pass structural check");
            return EntitySpan::new(span.label().clone(), span.start(), end, text)
                .ok()
                .map(|trimmed| trimmed.with_priority(span.source_priority()));
        }

        debug!(label = %span.label(), start = span.start(), "Span failed structural check");
        None
    }

    fn check_length(&self, text: &str) -> Result<()> {
        let max = self.inner.config.max_text_length;
        let length = text.chars().count();
        if length > max {
            return Err(InconnuError::text_too_long(length, max));
        }
        Ok(())
    }

    fn run(&self, text: &str, reversible: bool) -> Result<Redaction> {
        let spans = self.detect(text)?;
        Ok(self.inner.redactor.redact(text, &spans, reversible))
    }

    /// Redact `text` and return the full result.
    ///
    /// # Errors
    ///
    /// See [`detect`](Self::detect).
    pub fn process(&self, text: &str, reversible: bool) -> Result<ProcessedResult> {
        let started = Instant::now();
        let timestamp = Utc::now();

        let redaction = self.run(text, reversible)?;
        let elapsed = started.elapsed();

        let text_length = text.chars().count();
        info!(
            length = text_length,
            reversible,
            entities = redaction.spans.len(),
            "Processed document"
        );
        debug!(elapsed_ms = elapsed.as_secs_f64() * 1000.0, "Processing time");

        Ok(ProcessedResult {
            original_text: self.inner.config.store_original.then(|| text.to_string()),
            entity_count: redaction.spans.len(),
            redacted_text: redaction.text,
            entity_map: redaction.entity_map,
            position_map: redaction.position_map,
            text_length,
            hashed_id: hash_text(text),
            timestamp,
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
            reversible,
        })
    }

    /// Irreversibly redact `text` with bare `[LABEL]` placeholders.
    ///
    /// # Errors
    ///
    /// See [`detect`](Self::detect).
    pub fn redact(&self, text: &str) -> Result<String> {
        Ok(self.run(text, false)?.text)
    }

    /// Alias of [`redact`](Self::redact).
    ///
    /// # Errors
    ///
    /// See [`detect`](Self::detect).
    pub fn anonymize(&self, text: &str) -> Result<String> {
        self.redact(text)
    }

    /// Reversibly redact `text` with indexed placeholders.
    ///
    /// # Errors
    ///
    /// See [`detect`](Self::detect).
    pub fn pseudonymize(&self, text: &str) -> Result<(String, EntityMap)> {
        let redaction = self.run(text, true)?;
        Ok((redaction.text, redaction.entity_map))
    }

    /// Restore placeholders in `text` by scanning for them.
    #[must_use]
    pub fn restore(&self, text: &str, entity_map: &EntityMap) -> String {
        self.inner.restorer.restore(text, entity_map)
    }

    /// Restore placeholders at their recorded positions, falling back to
    /// scanning when the positions no longer hold.
    #[must_use]
    pub fn restore_with_positions(
        &self,
        text: &str,
        entity_map: &EntityMap,
        positions: &PositionMap,
    ) -> String {
        self.inner
            .restorer
            .restore_with_report(text, entity_map, Some(positions))
            .text
    }

    /// Restore placeholders and report how it went.
    #[must_use]
    pub fn restore_with_report(
        &self,
        text: &str,
        entity_map: &EntityMap,
        positions: Option<&PositionMap>,
    ) -> RestoreReport {
        self.inner
            .restorer
            .restore_with_report(text, entity_map, positions)
    }

    /// Restore a processed result.
    ///
    /// Uses the recorded positions while `redacted_text` is unchanged and
    /// scanning otherwise.
    #[must_use]
    pub fn deanonymize(&self, result: &ProcessedResult) -> String {
        self.restore_with_positions(&result.redacted_text, &result.entity_map, &result.position_map)
    }

    /// Irreversibly redact a large document in overlapping windows using
    /// the configured window size.
    ///
    /// The length limit applies per window, not to the whole document.
    ///
    /// # Errors
    ///
    /// Returns the first window failure.
    pub fn redact_stream(&self, text: &str) -> Result<String> {
        self.inner.chunker.redact(text, |window| self.redact(window))
    }

    /// Like [`redact_stream`](Self::redact_stream) with an explicit window
    /// size and overlap.
    ///
    /// # Errors
    ///
    /// Returns a config error for inconsistent sizes, or the first window
    /// failure.
    pub fn redact_stream_with(&self, text: &str, chunk_size: usize, overlap: usize) -> Result<String> {
        StreamChunker::new(chunk_size, overlap)?.redact(text, |window| self.redact(window))
    }

    /// Irreversibly redact many documents, in input order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partial results.
    pub fn redact_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<String>> {
        run_in_groups(texts, self.inner.config.batch_size, |text| {
            self.redact(text.as_ref())
        })
    }

    /// Reversibly redact many documents, in input order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; no partial results.
    pub fn pseudonymize_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<(String, EntityMap)>> {
        run_in_groups(texts, self.inner.config.batch_size, |text| {
            self.pseudonymize(text.as_ref())
        })
    }

    /// Restore many documents, in input order.
    #[must_use]
    pub fn restore_batch<S: AsRef<str>>(&self, items: &[(S, EntityMap)]) -> Vec<String> {
        items
            .iter()
            .map(|(text, map)| self.restore(text.as_ref(), map))
            .collect()
    }

    /// [`redact_batch`](Self::redact_batch) on the tokio blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the first failure, or [`InconnuError::Join`] if a worker
    /// panicked.
    pub async fn redact_batch_async(&self, texts: Vec<String>) -> Result<Vec<String>> {
        self.run_groups_blocking(texts, |engine, text| engine.redact(text))
            .await
    }

    /// [`pseudonymize_batch`](Self::pseudonymize_batch) on the tokio
    /// blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the first failure, or [`InconnuError::Join`] if a worker
    /// panicked.
    pub async fn pseudonymize_batch_async(&self, texts: Vec<String>) -> Result<Vec<(String, EntityMap)>> {
        self.run_groups_blocking(texts, |engine, text| engine.pseudonymize(text))
            .await
    }

    /// [`restore_batch`](Self::restore_batch) on the tokio blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`InconnuError::Join`] if a worker panicked.
    pub async fn restore_batch_async(&self, items: Vec<(String, EntityMap)>) -> Result<Vec<String>> {
        self.run_groups_blocking(items, |engine, (text, map)| Ok(engine.restore(text, map)))
            .await
    }

    /// Run `process` over `items` in groups of `batch_size`, one blocking
    /// task per group, keeping input order.
    async fn run_groups_blocking<T, R>(
        &self,
        items: Vec<T>,
        process: fn(&Self, &T) -> Result<R>,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
    {
        let batch_size = self.inner.config.batch_size.max(1);
        let total = items.len();

        let mut groups: Vec<Vec<T>> = Vec::with_capacity(total.div_ceil(batch_size));
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            groups.push(items.by_ref().take(batch_size).collect());
        }

        let tasks = groups.into_iter().enumerate().map(|(group, chunk)| {
            let engine = self.clone();
            tokio::task::spawn_blocking(move || {
                chunk
                    .iter()
                    .map(|item| process(&engine, item))
                    .collect::<Result<Vec<R>>>()
                    .inspect_err(|e| error!(group, error = %e, "Batch group failed"))
            })
        });
        let outputs = try_join_all(tasks).await?;

        let mut results = Vec::with_capacity(total);
        for output in outputs {
            results.extend(output?);
            log_progress(results.len(), total, batch_size);
        }
        Ok(results)
    }

    /// Labels the pipeline's components and catalog patterns can produce.
    ///
    /// Labels produced by the NER provider are not included.
    #[must_use]
    pub fn supported_patterns(&self) -> Vec<EntityLabel> {
        let mut labels: Vec<EntityLabel> = Vec::new();
        for component in &self.inner.components {
            if !labels.contains(component.label()) {
                labels.push(component.label().clone());
            }
        }
        labels
    }

    /// Describe likely mistakes in the component list.
    #[must_use]
    pub fn validate_components(&self) -> Vec<String> {
        component_problems(&self.inner.components, self.inner.redactor.excluded())
    }

    /// Get engine statistics.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let inner = &*self.inner;
        EngineStats {
            language: inner.config.language.clone(),
            provider: inner.provider.as_ref().map(|p| p.name().to_string()),
            components: inner.components.len(),
            patterns: inner.registry.len(),
            validators: inner.validators.len(),
            cache: inner.cache.as_ref().map(|c| c.stats()),
        }
    }
}

/// Builder for [`Inconnu`].
#[derive(Default)]
pub struct InconnuBuilder {
    config: Config,
    provider: Option<SharedProvider>,
    factory: Option<ProviderFactory>,
    cache: Option<Arc<ProviderCache>>,
    components: Vec<CustomComponent>,
    registry: PatternRegistry,
    validators: Option<ValidatorRegistry>,
}

impl fmt::Debug for InconnuBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InconnuBuilder")
            .field("config", &self.config)
            .field("components", &self.components.len())
            .field("patterns", &self.registry.len())
            .finish_non_exhaustive()
    }
}

impl InconnuBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the NER span provider.
    #[must_use]
    pub fn provider(mut self, provider: impl SpanProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Set a shared NER span provider.
    #[must_use]
    pub fn shared_provider(mut self, provider: SharedProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Create the NER provider lazily at build time.
    ///
    /// With a [`cache`](Self::cache) attached, the provider is looked up
    /// under the configured language and `create` runs only on a miss.
    #[must_use]
    pub fn provider_factory<F>(mut self, create: F) -> Self
    where
        F: FnOnce() -> Result<SharedProvider> + Send + 'static,
    {
        self.factory = Some(Box::new(create));
        self
    }

    /// Attach a provider cache.
    #[must_use]
    pub fn cache(mut self, cache: Arc<ProviderCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Add a custom component.
    #[must_use]
    pub fn component(mut self, component: CustomComponent) -> Self {
        self.components.push(component);
        self
    }

    /// Add several custom components.
    #[must_use]
    pub fn components<I>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = CustomComponent>,
    {
        self.components.extend(components);
        self
    }

    /// Set the pattern catalog. Domains enabled in the configuration are
    /// added to it at build time.
    #[must_use]
    pub fn registry(mut self, registry: PatternRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the structural validators.
    #[must_use]
    pub fn validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = Some(validators);
        self
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns a config error for inconsistent settings, a component error
    /// if a catalog pattern does not compile, or the provider factory's
    /// error.
    pub fn build(self) -> Result<Inconnu> {
        let config = self.config;
        config.validate()?;
        let chunker = StreamChunker::new(config.chunk_size, config.chunk_overlap)?;

        let registry = config
            .enabled_domains
            .iter()
            .copied()
            .fold(self.registry, PatternRegistry::with_domain);

        let mut components = default_components()?;
        components.extend(registry.components()?);
        components.extend(self.components);

        let provider = match (self.provider, self.factory) {
            (Some(provider), _) => Some(provider),
            (None, Some(create)) => Some(match &self.cache {
                Some(cache) => cache.get_or_create(&config.language, create)?,
                None => create()?,
            }),
            (None, None) => None,
        };

        let redactor = Redactor::new().excluded_labels(config.excluded_labels.iter().cloned());
        for problem in component_problems(&components, redactor.excluded()) {
            warn!(problem = %problem, "Suspicious component configuration");
        }

        debug!(
            components = components.len(),
            patterns = registry.len(),
            provider = provider.as_ref().map(|p| p.name().to_string()),
            "Built redaction engine"
        );

        Ok(Inconnu {
            inner: Arc::new(Inner {
                resolver: ConflictResolver::new().log_conflicts(config.log_conflicts),
                restorer: Restorer::new().warn_on_unmatched(config.warn_on_unmatched),
                redactor,
                chunker,
                provider,
                components,
                registry,
                validators: self.validators.unwrap_or_default(),
                cache: self.cache,
                config,
            }),
        })
    }
}

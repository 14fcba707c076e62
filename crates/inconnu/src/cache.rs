//! Per-language provider cache.
//!
//! NER backends are expensive to initialize, so hosts keep one instance per
//! language key. The cache is an ordinary value owned by the host: there is
//! no process-wide registry, and [`ProviderCache::clear`] releases every
//! instance it holds.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::Result;
use crate::provider::SpanProvider;

/// Shared handle to a cached provider.
pub type SharedProvider = Arc<dyn SpanProvider>;

/// Get-or-create registry of providers keyed by language.
#[derive(Default)]
pub struct ProviderCache {
    entries: RwLock<HashMap<String, SharedProvider>>,
    /// Total cache hits (for statistics).
    total_hits: AtomicUsize,
    /// Total cache misses (for statistics).
    total_misses: AtomicUsize,
}

impl ProviderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the provider for `language`, creating it with `create` on first
    /// access.
    ///
    /// Concurrent first accesses for the same key run `create` once: the
    /// key is re-checked under the write lock before creating.
    ///
    /// # Errors
    ///
    /// Returns the error from `create`; nothing is cached in that case.
    pub fn get_or_create<F>(&self, language: &str, create: F) -> Result<SharedProvider>
    where
        F: FnOnce() -> Result<SharedProvider>,
    {
        // Lock poisoning is recovered from: entries are only ever inserted
        // whole, so a panicking writer cannot leave a torn map behind.
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(provider) = entries.get(language) {
                self.total_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(provider));
            }
        }

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(provider) = entries.get(language) {
            self.total_hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(provider));
        }

        self.total_misses.fetch_add(1, Ordering::Relaxed);
        debug!(language, "Initializing span provider");
        let provider = create()?;
        entries.insert(language.to_string(), Arc::clone(&provider));
        Ok(provider)
    }

    /// Get a cached provider without creating one.
    #[must_use]
    pub fn get(&self, language: &str) -> Option<SharedProvider> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(language).cloned()
    }

    /// Check if a language is cached.
    #[must_use]
    pub fn contains(&self, language: &str) -> bool {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.contains_key(language)
    }

    /// Get the number of cached providers.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached provider.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.clear();
    }

    /// Drop the provider cached for one language.
    pub fn remove(&self, language: &str) -> Option<SharedProvider> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(language)
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            hits: self.total_hits.load(Ordering::Relaxed),
            misses: self.total_misses.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for ProviderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached providers.
    pub size: usize,
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups that created a provider.
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

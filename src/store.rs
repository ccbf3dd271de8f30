//! Process-wide translation state shared by every session.
//!
//! The cache and the failure registry are plain maps behind a mutex. Locks are
//! held only for the duration of a single map operation and never across an
//! `.await`, so callers on the render path never block for long.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A panic while holding one of these locks cannot leave a map half-written,
/// so a poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolved translations, keyed by target language then source text.
///
/// Entries are never evicted: the set of UI strings is small and fixed.
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a resolved translation.
    ///
    /// # Arguments
    /// * `language` - Target language code (e.g., "hi")
    /// * `text` - Source string exactly as authored in the UI
    ///
    /// # Returns
    /// * `Some(translation)` if a batch or single request resolved it
    /// * `None` if it was never resolved
    pub fn get(&self, language: &str, text: &str) -> Option<String> {
        lock(&self.entries)
            .get(language)
            .and_then(|translations| translations.get(text))
            .cloned()
    }

    pub fn contains(&self, language: &str, text: &str) -> bool {
        lock(&self.entries)
            .get(language)
            .is_some_and(|translations| translations.contains_key(text))
    }

    /// Store a translation. Writers racing on the same key all carry the same
    /// value, so the last one wins.
    pub fn set(&self, language: &str, text: &str, translation: &str) {
        lock(&self.entries)
            .entry(language.to_string())
            .or_default()
            .insert(text.to_string(), translation.to_string());
    }

    /// Store every (source, translation) pair of one batch response.
    ///
    /// # Arguments
    /// * `language` - Target language the batch was requested for
    /// * `translations` - Pairs keyed by source text
    pub fn extend<I>(&self, language: &str, translations: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        lock(&self.entries)
            .entry(language.to_string())
            .or_default()
            .extend(translations);
    }

    /// Copy of every translation known for `language`
    pub fn snapshot(&self, language: &str) -> HashMap<String, String> {
        lock(&self.entries)
            .get(language)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of translations known for `language`
    pub fn len(&self, language: &str) -> usize {
        lock(&self.entries).get(language).map_or(0, HashMap::len)
    }

    /// `true` if no language has any translation yet
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).values().all(HashMap::is_empty)
    }

    pub fn reset(&self) {
        lock(&self.entries).clear();
    }
}

/// (language, text) pairs whose translation failed.
///
/// Lookups consult this before queueing so a failing string is not requested
/// again on every render.
#[derive(Debug, Default)]
pub struct FailureRegistry {
    failed: Mutex<HashMap<String, HashSet<String>>>,
}

impl FailureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a request for this pair has already failed.
    ///
    /// # Arguments
    /// * `language` - Target language code
    /// * `text` - Source string
    ///
    /// # Returns
    /// `true` once [`FailureRegistry::mark_failed`] or
    /// [`FailureRegistry::mark_all_failed`] recorded the pair, until `reset`.
    pub fn has_failed(&self, language: &str, text: &str) -> bool {
        lock(&self.failed)
            .get(language)
            .is_some_and(|texts| texts.contains(text))
    }

    pub fn mark_failed(&self, language: &str, text: &str) {
        lock(&self.failed)
            .entry(language.to_string())
            .or_default()
            .insert(text.to_string());
    }

    pub fn mark_all_failed<'a, I>(&self, language: &str, texts: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        lock(&self.failed)
            .entry(language.to_string())
            .or_default()
            .extend(texts.into_iter().cloned());
    }

    /// Total number of failed pairs across languages
    pub fn len(&self) -> usize {
        lock(&self.failed).values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&self) {
        lock(&self.failed).clear();
    }
}

/// The cache and failure registry, shared (behind an `Arc`) by every
/// translator and session in the process.
#[derive(Debug, Default)]
pub struct TranslationStore {
    pub cache: TranslationCache,
    pub failures: FailureRegistry,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all translations and failures.
    pub fn reset(&self) {
        self.cache.reset();
        self.failures.reset();
    }
}

use crate::config::Config;
use crate::i18n::TranslationMetrics;
use crate::provider::TranslationProvider;
use crate::session::Session;
use crate::store::TranslationStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Behavior knobs shared by every session of a translator
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Language UI strings are written in; never translated
    pub identity_language: String,
    /// Quiet period after the last queued lookup before a batch is sent
    pub debounce: Duration,
    /// Whether translate-and-wait honors and records failures in the same
    /// registry as the lookup path
    pub shared_failures: bool,
}

impl TranslatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            identity_language: config.identity_language.clone(),
            debounce: config.debounce,
            shared_failures: config.shared_failures,
        }
    }
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            identity_language: "en".to_string(),
            debounce: Duration::from_millis(50),
            shared_failures: true,
        }
    }
}

/// What a coalesced flush did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Every text was already cached or known to fail; no request was sent
    NothingToFetch,
    /// The batch succeeded; carries the number of translations stored
    Translated(usize),
    /// The batch failed; carries the number of texts marked as failed
    Failed(usize),
}

struct Inner<P> {
    provider: P,
    store: Arc<TranslationStore>,
    options: TranslatorOptions,
    metrics: TranslationMetrics,
}

/// Entry point to the translation subsystem.
///
/// Cheap to clone; clones share the provider, store and metrics.
pub struct Translator<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Translator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: TranslationProvider> Translator<P> {
    pub fn new(provider: P, store: Arc<TranslationStore>, options: TranslatorOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                store,
                options,
                metrics: TranslationMetrics::new(),
            }),
        }
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.inner.store
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.inner.options
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.inner.metrics
    }

    pub fn is_identity(&self, language: &str) -> bool {
        language == self.inner.options.identity_language
    }

    /// Open a lookup session rendering in `language`.
    ///
    /// Spawns the session's debounce worker, so this must be called from
    /// within a Tokio runtime.
    pub fn session(&self, language: &str) -> Session<P> {
        Session::start(self.clone(), language)
    }

    /// Translate one text and wait for the result.
    ///
    /// The request bypasses the batch path entirely.
    ///
    /// # Arguments
    /// * `text` - Source string, e.g. a voice transcript
    /// * `language` - Target language code
    ///
    /// # Returns
    /// The translation, or `text` itself for the identity language, empty
    /// text, a pair already known to fail (with `shared_failures`), or any
    /// provider error. Never fails.
    pub async fn translate_now(&self, text: &str, language: &str) -> String {
        if text.is_empty() || self.is_identity(language) {
            return text.to_string();
        }

        let store = self.store();
        let metrics = self.metrics();
        let shared_failures = self.inner.options.shared_failures;

        if let Some(cached) = store.cache.get(language, text) {
            metrics.record_cache_hit();
            return cached;
        }
        if shared_failures && store.failures.has_failed(language, text) {
            metrics.record_suppressed();
            return text.to_string();
        }

        metrics.record_single_request();
        match self.inner.provider.translate_one(text, language).await {
            Ok(translated) => {
                store.cache.set(language, text, &translated);
                translated
            }
            Err(e) => {
                metrics.record_provider_failure();
                warn!("Translation to '{}' failed, showing source text: {}", language, e);
                if shared_failures {
                    store.failures.mark_failed(language, text);
                }
                text.to_string()
            }
        }
    }

    /// Send one batch for the texts collected during a debounce window.
    ///
    /// Duplicates are dropped, and so is anything that became cached or
    /// failed after it was queued. At most one provider call is made.
    ///
    /// # Arguments
    /// * `language` - Target language the texts were queued under
    /// * `texts` - Drained queue contents, in first-seen order
    ///
    /// # Returns
    /// * [`FlushOutcome::NothingToFetch`] if the recheck left nothing to send
    /// * [`FlushOutcome::Translated`] with the number of translations cached;
    ///   texts the provider left out are marked failed
    /// * [`FlushOutcome::Failed`] with the number of texts marked failed
    pub async fn flush_batch(&self, language: &str, texts: Vec<String>) -> FlushOutcome {
        let store = self.store();

        let mut seen = HashSet::new();
        let batch: Vec<String> = texts
            .into_iter()
            .filter(|text| seen.insert(text.clone()))
            .filter(|text| {
                !store.cache.contains(language, text) && !store.failures.has_failed(language, text)
            })
            .collect();

        if batch.is_empty() {
            debug!("Nothing left to fetch for '{}' after recheck", language);
            return FlushOutcome::NothingToFetch;
        }

        info!("Requesting {} translation(s) for '{}'", batch.len(), language);
        self.metrics().record_batch_request();

        match self.inner.provider.translate_batch(&batch, language).await {
            Ok(translations) => {
                let missing: Vec<String> = batch
                    .iter()
                    .filter(|text| !translations.contains_key(*text))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    warn!(
                        "Provider returned no translation to '{}' for {} text(s)",
                        language,
                        missing.len()
                    );
                    store.failures.mark_all_failed(language, &missing);
                }

                let resolved = translations.len();
                store.cache.extend(language, translations);
                FlushOutcome::Translated(resolved)
            }
            Err(e) => {
                self.metrics().record_provider_failure();
                warn!(
                    "Batch translation to '{}' failed for {} text(s), not retrying: {}",
                    language,
                    batch.len(),
                    e
                );
                store.failures.mark_all_failed(language, &batch);
                FlushOutcome::Failed(batch.len())
            }
        }
    }
}

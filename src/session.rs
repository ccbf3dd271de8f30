//! Synchronous lookup for UI rendering.
//!
//! A [`Session`] is what one rendering surface holds: it answers `lookup`
//! immediately with the best text it has, queues misses for the coalescer,
//! and publishes a new revision whenever fresh translations are ready so the
//! surface knows to render again.

use crate::coalescer::{self, FlushPhase, PendingQueue, Signal};
use crate::provider::TranslationProvider;
use crate::store::TranslationStore;
use crate::translator::Translator;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

#[derive(Debug)]
struct SessionState {
    /// Active target language
    language: String,
    pending: PendingQueue,
    /// Texts of `language` whose batch is in flight
    awaiting: HashSet<String>,
    /// Translations already handed to this session for `language`
    rendered: HashMap<String, String>,
    /// Batches spawned and not yet finished
    in_flight: usize,
}

/// State shared between the session handle, its debounce worker and the
/// batch tasks it spawns.
#[derive(Debug)]
struct SessionShared {
    state: Mutex<SessionState>,
    revision: watch::Sender<u64>,
}

impl SessionShared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    /// Called when the debounce window closes: drain the queue and send it
    /// off as one batch on its own task.
    fn dispatch<P: TranslationProvider>(self: &Arc<Self>, translator: &Translator<P>) {
        let (language, texts) = {
            let mut state = self.lock();
            if state.pending.is_empty() {
                return;
            }
            state.in_flight += 1;
            let texts = state.pending.drain();
            state.awaiting.extend(texts.iter().cloned());
            (state.language.clone(), texts)
        };

        debug!("Flushing {} queued text(s) for '{}'", texts.len(), language);
        let shared = Arc::clone(self);
        let translator = translator.clone();
        tokio::spawn(async move {
            let outcome = translator.flush_batch(&language, texts.clone()).await;
            debug!("Flush for '{}' finished: {:?}", language, outcome);
            shared.finish_flush(translator.store(), &language, &texts);
        });
    }

    /// Copy whatever is now cached into render state (only if the session is
    /// still on that language) and tell the UI to render again.
    fn finish_flush(&self, store: &TranslationStore, language: &str, texts: &[String]) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            if state.language == language {
                for text in texts {
                    state.awaiting.remove(text);
                }
                state.rendered.extend(store.cache.snapshot(language));
            }
        }
        self.bump_revision();
    }
}

/// Per-surface lookup handle.
///
/// Dropping the session stops its debounce worker; batches already in flight
/// still complete and fill the shared cache.
pub struct Session<P: TranslationProvider> {
    translator: Translator<P>,
    shared: Arc<SessionShared>,
    signals: mpsc::UnboundedSender<Signal>,
}

impl<P: TranslationProvider> Session<P> {
    pub(crate) fn start(translator: Translator<P>, language: &str) -> Self {
        let rendered = if translator.is_identity(language) {
            HashMap::new()
        } else {
            translator.store().cache.snapshot(language)
        };
        let (revision, _) = watch::channel(0);
        let shared = Arc::new(SessionShared {
            state: Mutex::new(SessionState {
                language: language.to_string(),
                pending: PendingQueue::default(),
                awaiting: HashSet::new(),
                rendered,
                in_flight: 0,
            }),
            revision,
        });

        let (signals, receiver) = mpsc::unbounded_channel();
        let queue_shared = Arc::clone(&shared);
        let worker_shared = Arc::clone(&shared);
        let worker_translator = translator.clone();
        tokio::spawn(coalescer::debounce_loop(
            receiver,
            translator.options().debounce,
            move || !queue_shared.lock().pending.is_empty(),
            move || worker_shared.dispatch(&worker_translator),
        ));

        Self {
            translator,
            shared,
            signals,
        }
    }

    /// Best text to show for `text` in `language`, right now.
    ///
    /// Never blocks and never fails. A miss under the active language is
    /// queued so a later render gets the real translation.
    ///
    /// # Arguments
    /// * `text` - Source string as authored in the UI
    /// * `language` - Target language code
    ///
    /// # Returns
    /// * `""` for absent or empty `text`
    /// * `text` unchanged for the identity language, with no side effects
    /// * The known translation, from render state or the shared cache
    /// * `text` as a placeholder otherwise
    ///
    /// Only [`Session::set_language`] changes the active language. A lookup
    /// under any other non-identity language reads the shared store and
    /// queues nothing.
    pub fn lookup(&self, text: Option<&str>, language: &str) -> String {
        let text = match text {
            Some(text) if !text.is_empty() => text,
            _ => return String::new(),
        };
        if self.translator.is_identity(language) {
            return text.to_string();
        }

        let mut state = self.shared.lock();
        if state.language != language {
            drop(state);
            return self.peek(text, language);
        }

        let (shown, queued) = self.resolve(&mut state, text, language);
        if queued {
            // Signals go out under the lock: channel order matches state order
            let _ = self.signals.send(Signal::Enqueued);
        }
        shown
    }

    /// `lookup` under the active language
    pub fn t(&self, text: &str) -> String {
        let language = self.language();
        self.lookup(Some(text), &language)
    }

    /// Translate `text` into the active language and wait for the result.
    ///
    /// Falls back to `text` on failure. A successful result also lands in
    /// render state.
    pub async fn translate_now(&self, text: &str) -> String {
        let language = self.language();
        let translated = self.translator.translate_now(text, &language).await;

        if let Some(cached) = self.translator.store().cache.get(&language, text) {
            let inserted = {
                let mut state = self.shared.lock();
                state.language == language
                    && state.rendered.insert(text.to_string(), cached).is_none()
            };
            if inserted {
                self.shared.bump_revision();
            }
        }
        translated
    }

    /// Change the active language.
    ///
    /// Queued texts are dropped rather than translated into the old language,
    /// and render state restarts from what the cache holds for the new one.
    pub fn set_language(&self, language: &str) {
        {
            let mut state = self.shared.lock();
            if state.language == language {
                return;
            }
            self.switch_language(&mut state, language);
            let _ = self.signals.send(Signal::Cancelled);
        }
        self.shared.bump_revision();
    }

    pub fn language(&self) -> String {
        self.shared.lock().language.clone()
    }

    /// Where this session's batching stands.
    ///
    /// # Returns
    /// * [`FlushPhase::Collecting`] while texts wait for the window to close
    /// * [`FlushPhase::Flushing`] while the queue is empty and a batch is out
    /// * [`FlushPhase::Idle`] otherwise
    pub fn phase(&self) -> FlushPhase {
        let state = self.shared.lock();
        if !state.pending.is_empty() {
            FlushPhase::Collecting
        } else if state.in_flight > 0 {
            FlushPhase::Flushing
        } else {
            FlushPhase::Idle
        }
    }

    /// Number of texts waiting for the next batch
    pub fn pending_len(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Render revisions: the value changes whenever new text is available
    /// or a batch finishes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    pub fn translator(&self) -> &Translator<P> {
        &self.translator
    }

    fn switch_language(&self, state: &mut SessionState, language: &str) {
        info!(
            "Switching session from '{}' to '{}', dropping {} queued text(s)",
            state.language,
            language,
            state.pending.len()
        );
        state.language = language.to_string();
        state.pending.clear();
        state.awaiting.clear();
        state.rendered = if self.translator.is_identity(language) {
            HashMap::new()
        } else {
            self.translator.store().cache.snapshot(language)
        };
    }

    /// Store-only answer for a language this session is not rendering
    fn peek(&self, text: &str, language: &str) -> String {
        let store = self.translator.store();
        let metrics = self.translator.metrics();

        if let Some(cached) = store.cache.get(language, text) {
            metrics.record_cache_hit();
            return cached;
        }
        if store.failures.has_failed(language, text) {
            metrics.record_suppressed();
        } else {
            debug!("'{}' not cached for inactive language '{}'", text, language);
        }
        text.to_string()
    }

    /// Returns the text to show and whether it was newly queued
    fn resolve(&self, state: &mut SessionState, text: &str, language: &str) -> (String, bool) {
        let store = self.translator.store();
        let metrics = self.translator.metrics();

        if let Some(rendered) = state.rendered.get(text) {
            metrics.record_cache_hit();
            return (rendered.clone(), false);
        }
        if let Some(cached) = store.cache.get(language, text) {
            metrics.record_cache_hit();
            state.rendered.insert(text.to_string(), cached.clone());
            return (cached, false);
        }
        if store.failures.has_failed(language, text) {
            metrics.record_suppressed();
            return (text.to_string(), false);
        }
        if state.awaiting.contains(text) {
            return (text.to_string(), false);
        }

        let queued = state.pending.push(text);
        if queued {
            metrics.record_cache_miss();
            debug!("Queued '{}' for '{}'", text, language);
        }
        (text.to_string(), queued)
    }
}

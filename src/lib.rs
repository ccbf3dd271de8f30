//! Cached, batched UI text translation.
//!
//! UI code renders through a [`Session`]: `lookup` answers synchronously with
//! the best text available and queues misses, which are coalesced into one
//! provider request per debounce window. Resolved translations live in a
//! process-wide [`TranslationStore`] shared by every session; texts that fail
//! are remembered so they are not requested on every render.
//!
//! ```rust,ignore
//! let store = Arc::new(TranslationStore::new());
//! let translator = Translator::new(provider, store, TranslatorOptions::default());
//! let session = translator.session("hi");
//!
//! let label = session.lookup(Some("Crop Advisor"), "hi"); // "Crop Advisor" for now
//! session.subscribe().changed().await?;
//! let label = session.lookup(Some("Crop Advisor"), "hi"); // translated
//! ```

pub mod coalescer;
pub mod config;
pub mod i18n;
pub mod provider;
pub mod retry;
pub mod session;
pub mod store;
pub mod translator;

pub use coalescer::FlushPhase;
pub use provider::{GoogleTranslateClient, ProviderError, TranslationProvider};
pub use session::Session;
pub use store::{FailureRegistry, TranslationCache, TranslationStore};
pub use translator::{FlushOutcome, Translator, TranslatorOptions};

//! Language metadata and translation metrics.
//!
//! - `registry`: the languages the app offers in its selector
//! - `language`: validated `Language` handle backed by the registry
//! - `metrics`: per-translator counters for cache and provider activity
//!
//! The translation core itself accepts any language code string; these types
//! are what the binary and UI layer use to pick and display a language.

mod language;
mod metrics;
mod registry;

pub use language::Language;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

/// Default Google Cloud Translation v2 endpoint
pub const DEFAULT_TRANSLATE_API_URL: &str =
    "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Clone)]
pub struct Config {
    // Translation provider
    pub translate_api_key: Option<String>,
    pub translate_api_url: String,
    pub request_timeout: Duration,

    // Lookup behavior
    pub identity_language: String,
    pub debounce: Duration,
    pub shared_failures: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source (used by tests to
    /// avoid touching the process environment)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debounce_ms: u64 = parse_or(&lookup, "TRANSLATION_DEBOUNCE_MS", 50)?;
        let timeout_secs: u64 = parse_or(&lookup, "TRANSLATION_TIMEOUT_SECS", 30)?;

        Ok(Self {
            translate_api_key: lookup("GOOGLE_CLOUD_API_KEY").filter(|k| !k.trim().is_empty()),
            translate_api_url: lookup("TRANSLATE_API_URL")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            request_timeout: Duration::from_secs(timeout_secs),

            identity_language: lookup("IDENTITY_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            debounce: Duration::from_millis(debounce_ms),
            shared_failures: parse_or(&lookup, "TRANSLATE_NOW_SHARES_FAILURES", true)?,
        })
    }

    /// Check `identity_language` against the language UI strings are
    /// authored in.
    ///
    /// # Returns
    /// * `Some(canonical)` if lookups would pass through a language other
    ///   than the registry's canonical one
    /// * `None` if the two agree
    pub fn identity_mismatch(&self) -> Option<&'static LanguageConfig> {
        LanguageRegistry::get()
            .canonical()
            .filter(|canonical| !canonical.code.eq_ignore_ascii_case(&self.identity_language))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", key, raw)),
        None => Ok(default),
    }
}

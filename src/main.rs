//! Render UI labels in a target language through a lookup session.
//!
//! Usage:
//!   cargo run -- hi                          # the app's tab labels in Hindi
//!   cargo run -- ta "Soil Analysis" "Yield"  # specific labels in Tamil
//!   cargo run -- --list                      # selectable languages
//!
//! Environment:
//! - GOOGLE_CLOUD_API_KEY (without it every label stays untranslated)
//!
//! Optional:
//! - TRANSLATE_API_URL, TRANSLATION_TIMEOUT_SECS, TRANSLATION_DEBOUNCE_MS,
//!   IDENTITY_LANGUAGE, TRANSLATE_NOW_SHARES_FAILURES

use anyhow::{bail, Result};
use krishi_translate::config::Config;
use krishi_translate::i18n::{Language, LanguageRegistry};
use krishi_translate::{GoogleTranslateClient, TranslationStore, Translator, TranslatorOptions};
use std::sync::Arc;
use tracing::{info, warn};

/// Labels of the app's bottom tab bar
const TAB_LABELS: [&str; 4] = [
    "Crop Advisor",
    "Disease Detection",
    "Crop Analysis",
    "Crop Rotation",
];

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("krishi_translate=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "--list") {
        for lang in LanguageRegistry::get().list_enabled() {
            println!("{}  {} ({})", lang.code, lang.name, lang.native_name);
        }
        return Ok(());
    }

    let Some((code, labels)) = args.split_first() else {
        bail!("Usage: krishi-translate [--list] <language> [label...]");
    };
    let language: Language = code.parse()?;
    let labels: Vec<String> = if labels.is_empty() {
        TAB_LABELS.iter().map(|label| label.to_string()).collect()
    } else {
        labels.to_vec()
    };

    let config = Config::from_env()?;
    if config.translate_api_key.is_none() {
        warn!("GOOGLE_CLOUD_API_KEY is not set. Translation services will not work.");
    }
    if let Some(canonical) = config.identity_mismatch() {
        warn!(
            "IDENTITY_LANGUAGE is '{}' but UI strings are authored in {} ('{}')",
            config.identity_language, canonical.name, canonical.code
        );
    }

    let provider = GoogleTranslateClient::from_config(&config)?;
    let translator = Translator::new(
        provider,
        Arc::new(TranslationStore::new()),
        TranslatorOptions::from_config(&config),
    );
    if language.is_canonical() || translator.is_identity(language.code()) {
        info!(
            "{} is the source language, labels are shown as written",
            language.name()
        );
    }
    let session = translator.session(language.code());
    let mut revisions = session.subscribe();

    info!(
        "Rendering {} label(s) in {} ({})",
        labels.len(),
        language.name(),
        language.native_name()
    );

    // First render: placeholders, misses get queued
    for label in &labels {
        session.t(label);
    }

    if session.pending_len() > 0 {
        // Covers the debounce window plus the provider's own retries
        let wait = config.debounce + config.request_timeout * 3;
        match tokio::time::timeout(wait, revisions.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Session closed before translations arrived: {}", e),
            Err(_) => warn!("Timed out after {:?} waiting for translations", wait),
        }
    }

    for label in &labels {
        println!("{} => {}", label, session.t(label));
    }

    let store = translator.store();
    if !translator.is_identity(language.code()) {
        if store.cache.is_empty() {
            warn!("No translations were resolved for '{}'", language.code());
        } else {
            info!(
                "Cache holds {} translation(s) for '{}'",
                store.cache.len(language.code()),
                language.code()
            );
        }
    }
    if !store.failures.is_empty() {
        warn!(
            "{} label(s) fell back to source text after a failed request",
            store.failures.len()
        );
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&translator.metrics().report())?
    );
    Ok(())
}

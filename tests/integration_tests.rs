//! Integration tests for the translation subsystem
//!
//! These drive a lookup session against the real Google Translate client
//! pointed at a mock HTTP server, from first render to translated text.

use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use krishi_translate::config::Config;
use krishi_translate::retry::RetryConfig;
use krishi_translate::{
    FlushPhase, GoogleTranslateClient, Session, TranslationStore, Translator, TranslatorOptions,
};

// ==================== Test Helpers ====================

const API_PATH: &str = "/language/translate/v2";

/// Config pointing at the mock server with a short debounce window
fn create_test_config(server: &MockServer, api_key: Option<&str>) -> Config {
    Config::from_lookup(|key| match key {
        "TRANSLATE_API_URL" => Some(format!("{}{}", server.uri(), API_PATH)),
        "GOOGLE_CLOUD_API_KEY" => api_key.map(str::to_string),
        "TRANSLATION_DEBOUNCE_MS" => Some("20".to_string()),
        "TRANSLATION_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .expect("Test config should be valid")
}

fn create_translator(config: &Config) -> Translator<GoogleTranslateClient> {
    let provider = GoogleTranslateClient::from_config(config)
        .expect("Client should build")
        .with_retry(RetryConfig::once());
    Translator::new(
        provider,
        Arc::new(TranslationStore::new()),
        TranslatorOptions::from_config(config),
    )
}

fn create_translate_response(translations: &[&str]) -> serde_json::Value {
    let items: Vec<_> = translations
        .iter()
        .map(|t| serde_json::json!({ "translatedText": t }))
        .collect();
    serde_json::json!({ "data": { "translations": items } })
}

/// Wait for the next render revision
async fn next_render(session: &Session<GoogleTranslateClient>) {
    let mut revisions = session.subscribe();
    tokio::time::timeout(Duration::from_secs(5), revisions.changed())
        .await
        .expect("Timed out waiting for a render revision")
        .expect("Session revision channel closed");
}

// ==================== Lookup Flow Tests ====================

#[tokio::test]
async fn test_tab_labels_translated_in_one_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "q": ["Crop Advisor", "Disease Detection"],
            "target": "hi",
            "format": "text"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_translate_response(&["सुझाव", "निदान"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);
    let session = translator.session("hi");
    let mut revisions = session.subscribe();

    assert_eq!(session.t("Crop Advisor"), "Crop Advisor");
    assert_eq!(session.t("Disease Detection"), "Disease Detection");
    assert_eq!(session.t("Crop Advisor"), "Crop Advisor");

    tokio::time::timeout(Duration::from_secs(5), revisions.changed())
        .await
        .expect("Timed out waiting for translations")
        .expect("Session revision channel closed");

    for _ in 0..3 {
        assert_eq!(session.t("Crop Advisor"), "सुझाव");
        assert_eq!(session.t("Disease Detection"), "निदान");
    }
    assert_eq!(session.phase(), FlushPhase::Idle);
    assert_eq!(translator.metrics().batch_requests(), 1);
}

#[tokio::test]
async fn test_second_session_reuses_shared_cache() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_translate_response(&["ফলন"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);

    let first = translator.session("bn");
    let mut revisions = first.subscribe();
    first.t("Yield");
    tokio::time::timeout(Duration::from_secs(5), revisions.changed())
        .await
        .expect("Timed out waiting for translations")
        .expect("Session revision channel closed");

    let second = translator.session("bn");
    assert_eq!(second.t("Yield"), "ফলন");
    assert_eq!(second.pending_len(), 0);
}

#[tokio::test]
async fn test_failed_batch_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);
    let session = translator.session("te");
    let mut revisions = session.subscribe();

    assert_eq!(session.t("Yield"), "Yield");
    tokio::time::timeout(Duration::from_secs(5), revisions.changed())
        .await
        .expect("Timed out waiting for the failed batch")
        .expect("Session revision channel closed");

    assert_eq!(session.t("Yield"), "Yield");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.t("Yield"), "Yield");
    assert_eq!(session.pending_len(), 0);
    assert!(translator.store().failures.has_failed("te", "Yield"));
    assert_eq!(translator.metrics().provider_failures(), 1);
}

#[tokio::test]
async fn test_missing_api_key_falls_back_without_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, None);
    let translator = create_translator(&config);
    let session = translator.session("ta");

    assert_eq!(session.t("Soil Analysis"), "Soil Analysis");
    next_render(&session).await;

    assert_eq!(session.t("Soil Analysis"), "Soil Analysis");
    assert!(translator.store().failures.has_failed("ta", "Soil Analysis"));
}

#[tokio::test]
async fn test_language_switch_only_requests_new_language() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(serde_json::json!({ "target": "hi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_translate_response(&["सुझाव"])))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(serde_json::json!({ "q": ["Crop Advisor"], "target": "bn" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_translate_response(&["শস্য উপদেষ্টা"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);
    let session = translator.session("hi");

    session.lookup(Some("Crop Advisor"), "hi");
    session.set_language("bn");
    let mut revisions = session.subscribe();
    assert_eq!(session.lookup(Some("Crop Advisor"), "bn"), "Crop Advisor");

    tokio::time::timeout(Duration::from_secs(5), revisions.changed())
        .await
        .expect("Timed out waiting for translations")
        .expect("Session revision channel closed");

    assert_eq!(session.t("Crop Advisor"), "শস্য উপদেষ্টা");
    assert_eq!(translator.store().cache.get("hi", "Crop Advisor"), None);
}

#[tokio::test]
async fn test_identity_language_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);
    let session = translator.session("en");

    for label in ["Crop Advisor", "Disease Detection", "Crop Analysis", "Crop Rotation"] {
        assert_eq!(session.t(label), label);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(session.pending_len(), 0);
    assert_eq!(session.phase(), FlushPhase::Idle);
}

// ==================== Translate-and-Wait Tests ====================

#[tokio::test]
async fn test_translate_now_for_voice_transcript() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(body_partial_json(serde_json::json!({
            "q": ["My wheat leaves have yellow spots"],
            "target": "hi"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_translate_response(&["मेरे गेहूं की पत्तियों पर पीले धब्बे हैं"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);
    let session = translator.session("hi");

    let translated = session.translate_now("My wheat leaves have yellow spots").await;
    assert_eq!(translated, "मेरे गेहूं की पत्तियों पर पीले धब्बे हैं");

    // Now cached: the lookup path resolves it without another request
    assert_eq!(
        session.t("My wheat leaves have yellow spots"),
        "मेरे गेहूं की पत्तियों पर पीले धब्बे हैं"
    );
}

#[tokio::test]
async fn test_concurrent_translate_now_calls_all_resolve() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_translate_response(&["ఉపజ"])))
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("test-key"));
    let translator = create_translator(&config);

    let results = futures::future::join_all(
        (0..4).map(|_| translator.translate_now("Yield", "te")),
    )
    .await;

    assert!(results.iter().all(|r| r == "ఉపజ"));
    assert_eq!(translator.store().cache.get("te", "Yield").as_deref(), Some("ఉపజ"));
}

#[tokio::test]
async fn test_translate_now_error_returns_source_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, Some("bad-key"));
    let translator = create_translator(&config);

    assert_eq!(translator.translate_now("Crop Rotation", "ta").await, "Crop Rotation");
    // Shared failure registry by default: the second call is suppressed
    assert_eq!(translator.translate_now("Crop Rotation", "ta").await, "Crop Rotation");
    assert_eq!(translator.metrics().single_requests(), 1);
}

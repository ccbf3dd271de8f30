use crate::config::Config;
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Failure of a call to the translation service
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("translation API key is not configured")]
    MissingApiKey,

    #[error("failed to reach translation API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("translation API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Network failures, rate limiting and 5xx are transient. Everything else
    /// (bad key, bad request, unexpected payload) fails the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ProviderError::MissingApiKey | ProviderError::MalformedResponse(_) => false,
        }
    }
}

/// A service that turns source strings into a target language
pub trait TranslationProvider: Send + Sync + 'static {
    /// Translate every text, returning a map from source text to translation
    fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>, ProviderError>> + Send;

    fn translate_one(
        &self,
        text: &str,
        target_language: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

/// Google Cloud Translation v2 request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a [String],
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for the Google Cloud Translation v2 REST API
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl GoogleTranslateClient {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key,
            retry: RetryConfig::provider_call(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build translation HTTP client")?;

        Ok(Self::new(
            client,
            &config.translate_api_url,
            config.translate_api_key.clone(),
        ))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn request(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let body = TranslateRequest {
            q: texts,
            target: target_language,
            format: "text",
        };

        let translations = with_retry_if(
            &self.retry,
            &format!("Translation to {}", target_language),
            || self.send(api_key, &body),
            ProviderError::is_retryable,
        )
        .await?;

        if translations.len() != texts.len() {
            return Err(ProviderError::MalformedResponse(format!(
                "expected {} translations, got {}",
                texts.len(),
                translations.len()
            )));
        }

        debug!(
            "Translated {} text(s) to {}",
            translations.len(),
            target_language
        );
        Ok(translations)
    }

    async fn send(
        &self,
        api_key: &str,
        body: &TranslateRequest<'_>,
    ) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Status { status, body });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

impl TranslationProvider for GoogleTranslateClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        target_language: &str,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let translations = self.request(texts, target_language).await?;
        Ok(texts.iter().cloned().zip(translations).collect())
    }

    async fn translate_one(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let texts = [text.to_string()];
        let mut translations = self.request(&texts, target_language).await?;
        translations
            .pop()
            .ok_or_else(|| ProviderError::MalformedResponse("no translations returned".to_string()))
    }
}

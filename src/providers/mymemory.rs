use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, warn};
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;

/// Templates for the pseudo e-mail sent as the `de` parameter
const IDENTITY_TEMPLATES: [&str; 5] = ["user", "translate", "subtitle", "video", "media"];
const IDENTITY_DOMAINS: [&str; 5] = ["example.com", "gmail.com", "yahoo.com", "hotmail.com", "outlook.com"];

/// Prefix MyMemory puts on the translated text when the daily quota is used up
const QUOTA_WARNING_PREFIX: &str = "MYMEMORY WARNING";

/// MyMemory client for the free translation memory API
///
/// The free tier is limited per identity, so when the quota is reported as
/// exhausted the client rotates to another identity and tries again.
#[derive(Debug)]
pub struct MyMemory {
    /// HTTP client for API requests
    client: Client,
    /// Base URL, the `/get` path is appended
    endpoint: String,
    /// Index mixed into the generated identity
    identity_index: AtomicUsize,
    /// How many identities may be tried for a single request
    max_rotations: u32,
}

/// Response body of `GET /get`
#[derive(Debug, Deserialize)]
pub struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    pub response_data: Option<MyMemoryResponseData>,

    /// Numeric on success, sometimes a string on errors
    #[serde(rename = "responseStatus", default)]
    pub response_status: Value,

    #[serde(rename = "responseDetails", default)]
    pub response_details: Value,

    #[serde(rename = "quotaFinished", default)]
    pub quota_finished: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MyMemoryResponseData {
    #[serde(rename = "translatedText", default)]
    pub translated_text: Option<String>,
}

/// Outcome of interpreting a response body
#[derive(Debug, PartialEq)]
pub enum MyMemoryOutcome {
    Translated(String),
    QuotaExhausted,
}

impl MyMemoryResponse {
    fn status_code(&self) -> Option<u16> {
        match &self.response_status {
            Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Classify the body into a translation, a quota signal or an error
    pub fn interpret(self) -> Result<MyMemoryOutcome, ProviderError> {
        let status = self.status_code().unwrap_or(200);
        let text = self.response_data.and_then(|d| d.translated_text);

        if status == 403 || self.quota_finished == Some(true) {
            return Ok(MyMemoryOutcome::QuotaExhausted);
        }
        if let Some(t) = &text {
            if t.trim_start().starts_with(QUOTA_WARNING_PREFIX) {
                return Ok(MyMemoryOutcome::QuotaExhausted);
            }
        }
        if status != 200 {
            let details = match self.response_details {
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(ProviderError::from_status(status, details));
        }

        text.filter(|t| !t.trim().is_empty())
            .map(MyMemoryOutcome::Translated)
            .ok_or_else(|| ProviderError::ParseError("MyMemory returned no translation".to_string()))
    }
}

impl MyMemory {
    /// Create a new MyMemory client
    pub fn new(endpoint: impl Into<String>, timeout: Duration, max_rotations: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            identity_index: AtomicUsize::new(1),
            max_rotations: max_rotations.max(1),
        }
    }

    /// Pseudo e-mail for the current identity index
    fn identity(&self) -> String {
        let index = self.identity_index.load(Ordering::Relaxed);
        let pick = rand::rng().random_range(0..IDENTITY_TEMPLATES.len());
        format!("{}{}@{}", IDENTITY_TEMPLATES[pick], index, IDENTITY_DOMAINS[pick])
    }

    fn rotate_identity(&self) {
        self.identity_index.fetch_add(1, Ordering::Relaxed);
    }

    fn request_url(&self, text: &str, langpair: &str, identity: &str) -> Result<Url, ProviderError> {
        let base = format!("{}/get", self.endpoint.trim_end_matches('/'));
        Url::parse_with_params(&base, &[("q", text), ("langpair", langpair), ("de", identity)])
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid MyMemory endpoint {}: {}", base, e)))
    }

    async fn request_once(&self, text: &str, langpair: &str, identity: String) -> Result<MyMemoryOutcome, ProviderError> {
        let url = self.request_url(text, langpair, &identity)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if status.as_u16() == 403 {
                return Ok(MyMemoryOutcome::QuotaExhausted);
            }
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let body = response.json::<MyMemoryResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse MyMemory response: {}", e)))?;
        body.interpret()
    }

    /// Call `fetch` with a fresh identity until it stops reporting quota, at most `max_rotations` times
    async fn with_identity_rotation<F, Fut>(&self, mut fetch: F) -> Result<String, ProviderError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<MyMemoryOutcome, ProviderError>>,
    {
        for rotation in 0..self.max_rotations {
            match fetch(self.identity()).await? {
                MyMemoryOutcome::Translated(translation) => return Ok(translation),
                MyMemoryOutcome::QuotaExhausted => {
                    warn!("MyMemory quota exhausted, rotating identity ({}/{})", rotation + 1, self.max_rotations);
                    self.rotate_identity();
                }
            }
        }

        Err(ProviderError::QuotaExceeded(
            "MyMemory daily quota exceeded. Try again tomorrow or use DeepL/OpenAI.".to_string(),
        ))
    }
}

#[async_trait]
impl Provider for MyMemory {
    async fn translate(&self, text: &str, source_language: Option<&str>, target_language: &str) -> Result<String, ProviderError> {
        let langpair = format!(
            "{}|{}",
            language_utils::mymemory_code(source_language),
            language_utils::mymemory_code(Some(target_language))
        );

        self.with_identity_rotation(|identity| self.request_once(text, &langpair, identity)).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let translated = self.translate("Hello", Some("en"), "fr").await?;
        debug!("MyMemory connection test returned '{}'", translated);
        Ok(())
    }
}

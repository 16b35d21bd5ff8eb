use std::time::Duration;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{strip_wrapping_quotes, Provider, UsageInfo};

const DEEPL_PRO_ENDPOINT: &str = "https://api.deepl.com";
const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com";

/// DeepL client for the v2 REST API
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// Authentication key
    api_key: String,
    /// API base URL without the `/v2` suffix
    endpoint: String,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct DeepLRequest {
    text: Vec<String>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

impl DeepLRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: vec![text.into()],
            target_lang: target_lang.into(),
            source_lang: None,
        }
    }

    pub fn source_lang(mut self, source_lang: Option<String>) -> Self {
        self.source_lang = source_lang;
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
pub struct DeepLTranslation {
    #[serde(default)]
    pub detected_source_language: Option<String>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct DeepLUsage {
    character_count: u64,
    character_limit: u64,
}

impl DeepL {
    /// Create a new DeepL client, an empty endpoint picks free or pro from the key
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        let api_key = api_key.into().trim().to_string();
        let endpoint = endpoint.into();
        let endpoint = if endpoint.is_empty() {
            Self::default_endpoint(&api_key).to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key,
            endpoint,
        }
    }

    /// Free-tier keys end in ":fx" and live on a separate host
    pub fn default_endpoint(api_key: &str) -> &'static str {
        if api_key.ends_with(":fx") {
            DEEPL_FREE_ENDPOINT
        } else {
            DEEPL_PRO_ENDPOINT
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await
            .unwrap_or_else(|_| "Failed to get error response text".to_string());
        error!("DeepL API error ({}): {}", status, error_text);
        Err(ProviderError::from_status(status.as_u16(), error_text))
    }

    /// Send a translate request
    pub async fn complete(&self, request: &DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("DeepL API key is not set".to_string()));
        }

        let response = self.client.post(format!("{}/v2/translate", self.endpoint))
            .header("Authorization", self.auth_header())
            .json(request)
            .send()
            .await?;

        Self::check_status(response).await?
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL response: {}", e)))
    }
}

#[async_trait]
impl Provider for DeepL {
    async fn translate(&self, text: &str, source_language: Option<&str>, target_language: &str) -> Result<String, ProviderError> {
        let request = DeepLRequest::new(text, language_utils::deepl_target_code(target_language))
            .source_lang(language_utils::deepl_source_code(source_language));

        let response = self.complete(&request).await?;
        response.translations.into_iter()
            .next()
            .map(|t| strip_wrapping_quotes(&t.text))
            .ok_or_else(|| ProviderError::ParseError("DeepL returned no translations".to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.usage().await.map(|_| ())
    }

    async fn usage(&self) -> Result<Option<UsageInfo>, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("DeepL API key is not set".to_string()));
        }

        let response = self.client.get(format!("{}/v2/usage", self.endpoint))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let usage = Self::check_status(response).await?
            .json::<DeepLUsage>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse DeepL usage: {}", e)))?;

        Ok(Some(UsageInfo {
            character_count: usage.character_count,
            character_limit: usage.character_limit,
        }))
    }
}

use std::time::Duration;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::{strip_wrapping_quotes, Provider};

/// OpenAI client for the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

impl OpenAIRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the completion token limit
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// System instruction for a translation into `language_name`
pub fn translation_instruction(language_name: &str) -> String {
    format!(
        "You are a professional subtitle translator. Translate the user's text into {lang}. \
         Translate literally and completely without censoring, softening or omitting anything, \
         while keeping the result natural for a native {lang} speaker. \
         Keep proper nouns and names as they are. \
         Preserve line breaks. Return only the translation without quotes or explanations.",
        lang = language_name
    )
}

/// Completion budget scaled to the input length
pub fn max_tokens_for(text: &str) -> u32 {
    let estimate = text.chars().count().saturating_mul(3);
    u32::try_from(estimate).unwrap_or(u32::MAX).clamp(64, 1500)
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Complete a chat request
    pub async fn complete(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::NotConfigured("OpenAI API key is not set".to_string()));
        }

        let response = self.client.post(self.api_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI response: {}", e)))
    }

    /// Extract text from a chat response
    pub fn extract_text_from_response(response: &OpenAIResponse) -> Option<String> {
        response.choices.first()
            .map(|c| strip_wrapping_quotes(&c.message.content))
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn translate(&self, text: &str, _source_language: Option<&str>, target_language: &str) -> Result<String, ProviderError> {
        let language_name = language_utils::display_name_for_prompt(target_language);
        let request = OpenAIRequest::new(&self.model)
            .add_message("system", translation_instruction(&language_name))
            .add_message("user", text)
            .temperature(self.temperature)
            .max_tokens(max_tokens_for(text));

        let response = self.complete(&request).await?;
        Self::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError("OpenAI returned an empty completion".to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = OpenAIRequest::new(&self.model)
            .add_message("user", "Hello")
            .max_tokens(5);
        self.complete(&request).await.map(|_| ())
    }
}

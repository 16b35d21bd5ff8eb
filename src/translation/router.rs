/*!
 * Provider fallback routing.
 *
 * A unit is offered to the preferred provider first, then to the free
 * provider, then to each keyed provider that has a credential. Every attempt
 * goes through the retry controller, and every backend call goes through the
 * cache and the request throttle.
 */

use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, warn};

use crate::app_config::TranslationProvider;
use crate::credentials::Credentials;
use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::providers::registry::ProviderRegistry;

use super::cache::TranslationCache;
use super::retry::{with_retry, RetryPolicy};
use super::throttle::RequestThrottle;

/// Parameters shared by every unit of a translation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Target language code
    pub target_language: String,

    /// Source language hint, `None` lets the provider detect it
    pub source_language: Option<String>,

    /// Cache scope of the document being translated
    pub document_scope: Option<String>,
}

impl TranslationRequest {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: None,
            document_scope: None,
        }
    }

    pub fn with_source_language(mut self, source_language: Option<String>) -> Self {
        self.source_language = source_language.filter(|s| !crate::language_utils::is_auto(Some(s)));
        self
    }

    pub fn with_document_scope(mut self, scope: impl Into<String>) -> Self {
        self.document_scope = Some(scope.into());
        self
    }
}

/// Something that can translate one unit, used by the batch scheduler
#[async_trait]
pub trait UnitTranslator: Send + Sync {
    /// Translate through the full fallback chain
    async fn translate_unit(
        &self,
        text: &str,
        preferred: TranslationProvider,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError>;

    /// Translate through exactly one provider, with retries
    async fn translate_with(
        &self,
        text: &str,
        provider: TranslationProvider,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError>;

    /// Available providers other than `preferred`, in fallback order
    fn alternate_providers(&self, preferred: TranslationProvider) -> Vec<TranslationProvider>;
}

/// Routes units across providers with retries, caching and throttling
#[derive(Debug, Clone)]
pub struct FallbackRouter {
    registry: ProviderRegistry,
    credentials: Credentials,
    cache: TranslationCache,
    throttle: RequestThrottle,
    retry_policy: RetryPolicy,
}

impl FallbackRouter {
    pub fn new(
        registry: ProviderRegistry,
        credentials: Credentials,
        cache: TranslationCache,
        throttle: RequestThrottle,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self { registry, credentials, cache, throttle, retry_policy }
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    fn is_available(&self, provider: TranslationProvider) -> bool {
        self.registry.contains(provider) && self.credentials.has_credential(provider)
    }

    /// Ordered, de-duplicated list of providers to try
    pub fn candidates(&self, preferred: TranslationProvider) -> Vec<TranslationProvider> {
        let mut ordered = vec![preferred];
        for provider in TranslationProvider::FALLBACK_ORDER {
            if !ordered.contains(&provider) {
                ordered.push(provider);
            }
        }
        ordered.into_iter().filter(|p| self.is_available(*p)).collect()
    }

    /// One backend call: cache, then throttle, then the provider itself
    async fn call_provider(
        &self,
        id: TranslationProvider,
        provider: &Arc<dyn Provider>,
        text: &str,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let scope = request.document_scope.as_deref();
        let provider_name = id.to_lowercase_string();

        if let Some(cached) = self.cache.get(scope, &provider_name, &request.target_language, text) {
            return Ok(cached);
        }

        self.throttle.wait().await;
        let translated = provider
            .translate(text, request.source_language.as_deref(), &request.target_language)
            .await?;

        self.cache.put(scope, &provider_name, &request.target_language, text, &translated);
        Ok(translated)
    }

    async fn call_with_retry(
        &self,
        id: TranslationProvider,
        text: &str,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        let provider = self.registry.get(id)
            .ok_or_else(|| ProviderError::NotConfigured(format!("{} is not registered", id.display_name())))?;
        with_retry(&self.retry_policy, id.display_name(), || self.call_provider(id, &provider, text, request)).await
    }

    /// Try every candidate in order; fails only when all of them, and the last resort, fail
    pub async fn translate_with_fallback(
        &self,
        text: &str,
        preferred: TranslationProvider,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let mut last_error = None;
        for candidate in self.candidates(preferred) {
            match self.call_with_retry(candidate, text, request).await {
                Ok(translated) => return Ok(translated),
                Err(e) => {
                    warn!("{} failed, trying next provider: {}", candidate.display_name(), e);
                    last_error = Some(e);
                }
            }
        }

        // Last resort: one more unretried call to the free provider
        if let Some(free) = self.registry.get(TranslationProvider::MyMemory) {
            debug!("All providers failed, making a last attempt with MyMemory");
            match self.call_provider(TranslationProvider::MyMemory, &free, text, request).await {
                Ok(translated) => return Ok(translated),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NotConfigured("No translation provider is available".to_string())))
    }

    /// Translate, falling back to the original text when every provider fails
    pub async fn translate_auto(
        &self,
        text: &str,
        preferred: TranslationProvider,
        request: &TranslationRequest,
    ) -> String {
        match self.translate_with_fallback(text, preferred, request).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("All translation services failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}

#[async_trait]
impl UnitTranslator for FallbackRouter {
    async fn translate_unit(
        &self,
        text: &str,
        preferred: TranslationProvider,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        self.translate_with_fallback(text, preferred, request).await
    }

    async fn translate_with(
        &self,
        text: &str,
        provider: TranslationProvider,
        request: &TranslationRequest,
    ) -> Result<String, ProviderError> {
        if !self.is_available(provider) {
            return Err(ProviderError::NotConfigured(format!("{} is not available", provider.display_name())));
        }
        self.call_with_retry(provider, text, request).await
    }

    fn alternate_providers(&self, preferred: TranslationProvider) -> Vec<TranslationProvider> {
        self.candidates(preferred).into_iter().filter(|p| *p != preferred).collect()
    }
}

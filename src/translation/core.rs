/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns the fallback router and the host's resource
 * profile, and drives whole-document passes: read, segment, translate in
 * batches, reassemble and write. Progress for each pass is published through
 * a `ProgressSink`.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::app_config::{Config, TranslationProvider};
use crate::credentials::{CredentialStore, Credentials};
use crate::errors::{AppError, TranslationError};
use crate::file_utils::FileManager;
use crate::progress::{PassTracker, ProgressEvent, ProgressSink, UnitProgress};
use crate::providers::UsageInfo;
use crate::providers::registry::ProviderRegistry;
use crate::subtitle_processor::SegmentedDocument;

use super::batch::{BatchOptions, BatchTranslator};
use super::cache::{CacheStats, TranslationCache};
use super::concurrency::{concurrency_window, ProviderProfile, SystemResources};
use super::retry::RetryPolicy;
use super::router::{FallbackRouter, TranslationRequest};
use super::throttle::RequestThrottle;

/// Result of checking one keyed provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderCheck {
    pub provider: TranslationProvider,
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
}

/// Outcome of a credential validation run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CredentialReport {
    pub checks: Vec<ProviderCheck>,
}

impl CredentialReport {
    /// Whether every configured credential was accepted
    pub fn all_valid(&self) -> bool {
        self.checks.iter().all(|c| c.valid || c.message == NOT_CONFIGURED_MESSAGE)
    }

    pub fn check_for(&self, provider: TranslationProvider) -> Option<&ProviderCheck> {
        self.checks.iter().find(|c| c.provider == provider)
    }
}

const NOT_CONFIGURED_MESSAGE: &str = "No API key configured";

/// Translation service orchestrating providers, cache and batching
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Configuration for the translation service
    pub config: Config,

    /// Credentials the registry was built from
    credentials: Credentials,

    /// Provider fallback router
    router: FallbackRouter,

    /// Host resources used to size the concurrency window
    resources: SystemResources,
}

impl TranslationService {
    /// Create a service backed by the real provider clients
    pub fn new(config: Config, credentials: Credentials) -> Self {
        let registry = ProviderRegistry::from_config(&config.translation, &credentials);
        Self::with_registry(config, credentials, registry)
    }

    /// Create a service from credentials held in a store
    pub fn from_store(config: Config, store: &dyn CredentialStore) -> Result<Self, AppError> {
        let credentials = store.load_credentials()?;
        Ok(Self::new(config, credentials))
    }

    /// Create a service around an explicit provider registry
    pub fn with_registry(config: Config, credentials: Credentials, registry: ProviderRegistry) -> Self {
        let common = &config.translation.common;
        let cache = TranslationCache::new(common.enable_cache, common.cache_capacity);
        let throttle = RequestThrottle::new(Duration::from_millis(common.min_request_interval_ms));
        let retry_policy = RetryPolicy::new(common.retry_count, Duration::from_millis(common.retry_backoff_ms));
        let router = FallbackRouter::new(registry, credentials.clone(), cache, throttle, retry_policy);

        Self {
            config,
            credentials,
            router,
            resources: SystemResources::detect(),
        }
    }

    /// Replace the detected host resources
    pub fn with_resources(mut self, resources: SystemResources) -> Self {
        self.resources = resources;
        self
    }

    pub fn router(&self) -> &FallbackRouter {
        &self.router
    }

    /// Batch settings for a pass with `provider` preferred
    pub fn batch_options(&self, provider: TranslationProvider) -> BatchOptions {
        let common = &self.config.translation.common;
        let provider_config = self.config.translation.resolved_provider_config(provider);
        let profile = ProviderProfile::for_provider(provider)
            .with_overrides(provider_config.batch_size, provider_config.max_concurrent_batches);

        BatchOptions {
            batching_enabled: common.batch_translation,
            batch_size: profile.batch_size,
            concurrency_window: concurrency_window(&profile, common.max_concurrent_batches, &self.resources),
            unit_retry_delay: Duration::from_millis(common.unit_retry_delay_ms),
            inter_group_delay: Duration::from_millis(common.inter_group_delay_ms),
        }
    }

    /// Translate the dialogue of an in-memory subtitle document
    pub async fn translate_content(
        &self,
        content: &str,
        provider: TranslationProvider,
        request: &TranslationRequest,
        progress: &(dyn Fn(UnitProgress) + Send + Sync),
    ) -> String {
        let document = SegmentedDocument::segment(content);
        let texts = document.source_texts();
        debug!("Segmented document into {} lines and {} units", document.lines.len(), texts.len());

        let translator = BatchTranslator::new(&self.router, self.batch_options(provider));
        let translated = translator.translate_batch(&texts, provider, request, progress).await;
        document.reassemble_in_order(&translated)
    }

    /// Translate a subtitle file and write the result next to it, or to `output`
    ///
    /// Provider failures never fail the pass: units that cannot be translated
    /// keep their source text. Only reading and writing the document can fail.
    pub async fn translate_document(
        &self,
        input: &Path,
        output: Option<&Path>,
        provider: TranslationProvider,
        target_language: &str,
        progress: &dyn ProgressSink,
        source_language: Option<&str>,
    ) -> Result<PathBuf, TranslationError> {
        let tracker = PassTracker::new(progress);
        tracker.start(format!("Reading {}", input.display()));

        let bytes = match std::fs::read(input) {
            Ok(bytes) => bytes,
            Err(source) => {
                error!("Failed to read {:?}: {}", input, source);
                tracker.fail(format!("Failed to read {}: {}", input.display(), source));
                return Err(TranslationError::DocumentRead { path: input.to_path_buf(), source });
            }
        };
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => {
                error!("{:?} is not valid UTF-8", input);
                tracker.fail(format!("{} is not valid UTF-8", input.display()));
                return Err(TranslationError::InvalidEncoding(input.to_path_buf()));
            }
        };

        let scope = input.to_string_lossy().to_string();
        let request = TranslationRequest::new(target_language)
            .with_source_language(source_language.map(str::to_string))
            .with_document_scope(scope.clone());

        let document = SegmentedDocument::segment(&content);
        let texts = document.source_texts();
        let total = texts.len();
        info!(
            "Translating {} dialogue units from {} with {}",
            total,
            input.display(),
            provider.display_name()
        );

        if total > 0 {
            tracker.translating(0, total, Some(format!("Translating {} units", total)));
        }

        let on_unit = |unit: UnitProgress| {
            tracker.translating(unit.current, unit.total, Some(unit.text_preview));
        };
        let translator = BatchTranslator::new(&self.router, self.batch_options(provider));
        let translated = translator.translate_batch(&texts, provider, &request, &on_unit).await;
        let result = document.reassemble_in_order(&translated);

        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(input, target_language),
        };

        if let Err(e) = FileManager::write_atomic(&output_path, &result) {
            error!("Failed to write {:?}: {:#}", output_path, e);
            tracker.fail(format!("Failed to write {}: {}", output_path.display(), e));
            self.router.cache().clear_scope(&scope);
            return Err(TranslationError::DocumentWrite { path: output_path, message: format!("{:#}", e) });
        }

        let cleared = self.router.cache().clear_scope(&scope);
        debug!("Released {} cached translations for {}", cleared, scope);

        tracker.complete(format!("Saved {}", output_path.display()));
        info!("Translation saved to {}", output_path.display());
        Ok(output_path)
    }

    /// Translate a single piece of text, returning it unchanged when every provider fails
    pub async fn translate_text(&self, text: &str, provider: TranslationProvider, target_language: &str) -> String {
        let request = TranslationRequest::new(target_language)
            .with_source_language(Some(self.config.source_language.clone()));
        self.router.translate_auto(text, provider, &request).await
    }

    /// Check the stored credential of every keyed provider
    pub async fn validate_credentials(&self, progress: &dyn ProgressSink) -> CredentialReport {
        check_providers(self.router.registry(), &self.credentials, progress).await
    }

    /// Check credentials that have not been saved yet
    pub async fn validate_candidate_credentials(
        &self,
        candidate: &Credentials,
        progress: &dyn ProgressSink,
    ) -> CredentialReport {
        let mut merged = self.credentials.clone();
        merged.merge(candidate);
        let registry = ProviderRegistry::from_config(&self.config.translation, &merged);
        check_providers(&registry, &merged, progress).await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.router.cache().stats()
    }

    pub fn clear_cache(&self) {
        self.router.cache().clear();
    }

    pub fn cache(&self) -> &TranslationCache {
        self.router.cache()
    }
}

async fn check_providers(
    registry: &ProviderRegistry,
    credentials: &Credentials,
    progress: &dyn ProgressSink,
) -> CredentialReport {
    let mut report = CredentialReport::default();

    for provider in TranslationProvider::FALLBACK_ORDER.into_iter().filter(|p| p.requires_credential()) {
        let client = match (credentials.get(provider), registry.get(provider)) {
            (Some(_), Some(client)) => client,
            _ => {
                report.checks.push(ProviderCheck {
                    provider,
                    valid: false,
                    message: NOT_CONFIGURED_MESSAGE.to_string(),
                    usage: None,
                });
                continue;
            }
        };

        let outcome = match client.usage().await {
            Ok(Some(usage)) => Ok(Some(usage)),
            Ok(None) => client.test_connection().await.map(|_| None),
            Err(e) => Err(e),
        };

        let check = match outcome {
            Ok(usage) => ProviderCheck {
                provider,
                valid: true,
                message: match &usage {
                    Some(u) => format!("Valid ({} / {} characters used)", u.character_count, u.character_limit),
                    None => "Valid".to_string(),
                },
                usage,
            },
            Err(e) => {
                warn!("{} credential check failed: {}", provider.display_name(), e);
                progress.emit(ProgressEvent::error(format!("{}: {}", provider.display_name(), e.user_message())));
                ProviderCheck { provider, valid: false, message: e.user_message(), usage: None }
            }
        };
        report.checks.push(check);
    }

    report
}

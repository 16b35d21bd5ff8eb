use std::collections::HashMap;
use std::sync::Arc;
use log::debug;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::credentials::Credentials;
use crate::providers::Provider;
use crate::providers::deepl::DeepL;
use crate::providers::mymemory::MyMemory;
use crate::providers::openai::OpenAI;

/// Provider instances keyed by provider identifier
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<TranslationProvider, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the real backends; keyed providers are only registered when a key exists
    pub fn from_config(config: &TranslationConfig, credentials: &Credentials) -> Self {
        let mut registry = Self::new();
        let common = &config.common;

        let mymemory = config.resolved_provider_config(TranslationProvider::MyMemory);
        registry.register(
            TranslationProvider::MyMemory,
            Arc::new(MyMemory::new(mymemory.endpoint.clone(), mymemory.timeout(), common.identity_rotations)),
        );

        if let Some(key) = credentials.get(TranslationProvider::DeepL) {
            let deepl = config.resolved_provider_config(TranslationProvider::DeepL);
            registry.register(
                TranslationProvider::DeepL,
                Arc::new(DeepL::new(key, deepl.endpoint.clone(), deepl.timeout())),
            );
        }

        if let Some(key) = credentials.get(TranslationProvider::OpenAI) {
            let openai = config.resolved_provider_config(TranslationProvider::OpenAI);
            registry.register(
                TranslationProvider::OpenAI,
                Arc::new(OpenAI::new(key, openai.endpoint.clone(), openai.model.clone(), common.temperature, openai.timeout())),
            );
        }

        debug!("Registered providers: {:?}", registry.registered());
        registry
    }

    pub fn register(&mut self, id: TranslationProvider, provider: Arc<dyn Provider>) {
        self.providers.insert(id, provider);
    }

    /// Builder-style register
    pub fn with(mut self, id: TranslationProvider, provider: Arc<dyn Provider>) -> Self {
        self.register(id, provider);
        self
    }

    pub fn get(&self, id: TranslationProvider) -> Option<Arc<dyn Provider>> {
        self.providers.get(&id).cloned()
    }

    pub fn contains(&self, id: TranslationProvider) -> bool {
        self.providers.contains_key(&id)
    }

    /// Registered providers in fallback order
    pub fn registered(&self) -> Vec<TranslationProvider> {
        TranslationProvider::FALLBACK_ORDER.iter()
            .copied()
            .filter(|p| self.contains(*p))
            .collect()
    }
}

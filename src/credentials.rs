/*!
 * API credential storage.
 *
 * The engine only needs to read provider keys and to save updated ones; how
 * they are protected at rest belongs to the store implementation.
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use log::debug;

use crate::app_config::TranslationProvider;
use crate::errors::AppError;

/// Provider secrets keyed by provider identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(BTreeMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, provider: TranslationProvider, secret: impl Into<String>) -> Self {
        self.set(provider, secret);
        self
    }

    pub fn set(&mut self, provider: TranslationProvider, secret: impl Into<String>) {
        self.0.insert(provider.to_lowercase_string(), secret.into().trim().to_string());
    }

    /// Non-empty secret for a provider
    pub fn get(&self, provider: TranslationProvider) -> Option<&str> {
        self.0.get(&provider.to_lowercase_string())
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether the provider can be selected with these credentials
    pub fn has_credential(&self, provider: TranslationProvider) -> bool {
        !provider.requires_credential() || self.get(provider).is_some()
    }

    /// Overlay non-empty entries from `other`
    pub fn merge(&mut self, other: &Credentials) {
        for (provider, secret) in &other.0 {
            if !secret.trim().is_empty() {
                self.0.insert(provider.clone(), secret.trim().to_string());
            }
        }
    }

    /// Providers with a non-empty secret
    pub fn configured_providers(&self) -> Vec<TranslationProvider> {
        TranslationProvider::FALLBACK_ORDER.iter()
            .copied()
            .filter(|p| p.requires_credential() && self.get(*p).is_some())
            .collect()
    }
}

/// Source and sink of provider credentials
pub trait CredentialStore: Send + Sync {
    /// Load all stored credentials
    fn load_credentials(&self) -> Result<Credentials, AppError>;

    /// Merge and persist a partial update; returns whether anything was written
    fn save_credentials(&self, partial: &Credentials) -> Result<bool, AppError>;
}

/// Credentials kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the user's configuration directory
    pub fn default_location() -> Result<Self, AppError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| AppError::Credentials("Unable to determine configuration directory".to_string()))?;
        Ok(Self::new(dir.join("subtrans").join("credentials.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonCredentialStore {
    fn load_credentials(&self) -> Result<Credentials, AppError> {
        if !self.path.exists() {
            debug!("No credential file at {:?}", self.path);
            return Ok(Credentials::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Credentials::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_credentials(&self, partial: &Credentials) -> Result<bool, AppError> {
        let mut current = self.load_credentials()?;
        let before = current.clone();
        current.merge(partial);
        if current == before && self.path.exists() {
            return Ok(false);
        }

        let parent = self.path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let mut file = tempfile::NamedTempFile::new_in(parent)?;
        file.write_all(serde_json::to_string_pretty(&current)?.as_bytes())?;
        file.persist(&self.path)
            .map_err(|e| AppError::File(format!("Failed to persist credentials: {}", e)))?;
        Ok(true)
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { inner: Mutex::new(credentials) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load_credentials(&self) -> Result<Credentials, AppError> {
        Ok(self.inner.lock().clone())
    }

    fn save_credentials(&self, partial: &Credentials) -> Result<bool, AppError> {
        let mut inner = self.inner.lock();
        let before = inner.clone();
        inner.merge(partial);
        Ok(*inner != before)
    }
}

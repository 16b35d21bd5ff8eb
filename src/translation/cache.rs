/*!
 * Translation caching functionality.
 *
 * Translations are kept in a bounded LRU store keyed by document scope,
 * provider, target language and a hash of the source text. Scoping entries
 * to a document lets a finished pass drop its entries without touching the
 * rest of the cache.
 */

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use log::debug;

/// Default number of cached translations
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Cache key derived from a translation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Document the entry belongs to, `None` for cross-document entries
    pub document_scope: Option<String>,

    /// Provider identifier
    pub provider: String,

    /// Target language code
    pub target_language: String,

    /// Hex digest of the source text
    pub text_hash: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(document_scope: Option<&str>, provider: &str, target_language: &str, source_text: &str) -> Self {
        Self {
            document_scope: document_scope.map(str::to_string),
            provider: provider.to_string(),
            target_language: target_language.to_string(),
            text_hash: hash_text(source_text),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.document_scope.as_deref().unwrap_or("global"),
            self.provider,
            self.target_language,
            self.text_hash
        )
    }
}

/// First 16 bytes of the SHA-256 digest, hex-encoded
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest.iter().take(16).map(|b| format!("{:02x}", b)).collect()
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
    pub capacity: usize,
    pub hit_rate: f64,
}

/// Translation cache for storing and retrieving translations
#[derive(Clone)]
pub struct TranslationCache {
    /// Internal cache storage
    cache: Arc<Mutex<LruCache<CacheKey, String>>>,

    /// Cache hit counter
    hits: Arc<AtomicUsize>,

    /// Cache miss counter
    misses: Arc<AtomicUsize>,

    /// Maximum number of entries
    capacity: usize,

    /// Whether caching is enabled
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool, capacity: usize) -> Self {
        let bounded = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(bounded))),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
            capacity: bounded.get(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get a translation from the cache, promoting it to most recently used
    pub fn get(&self, document_scope: Option<&str>, provider: &str, target_language: &str, source_text: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(document_scope, provider, target_language, source_text);
        let found = self.cache.lock().get(&key).cloned();

        match found {
            Some(translation) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for '{}' ({})", truncate_text(source_text, 30), key);
                Some(translation)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for '{}' ({} -> {})", truncate_text(source_text, 30), provider, target_language);
                None
            }
        }
    }

    /// Store a translation, evicting the least recently used entry when full
    pub fn put(&self, document_scope: Option<&str>, provider: &str, target_language: &str, source_text: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(document_scope, provider, target_language, source_text);
        let evicted = self.cache.lock().push(key.clone(), translation.to_string());

        if let Some((old_key, _)) = evicted {
            if old_key != key {
                debug!("Evicted cache entry {}", old_key);
            }
        }
    }

    /// Remove every entry belonging to a document scope
    pub fn clear_scope(&self, document_scope: &str) -> usize {
        let mut cache = self.cache.lock();
        let doomed: Vec<CacheKey> = cache.iter()
            .filter(|(key, _)| key.document_scope.as_deref() == Some(document_scope))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            cache.pop(key);
        }

        debug!("Cleared {} cache entries for scope {}", doomed.len(), document_scope);
        doomed.len()
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            size: self.len(),
            capacity: self.capacity,
            hit_rate: if total > 0 { hits as f64 / total as f64 } else { 0.0 },
        }
    }
}

impl fmt::Debug for TranslationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationCache")
            .field("enabled", &self.enabled)
            .field("capacity", &self.capacity)
            .field("size", &self.len())
            .finish()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true, DEFAULT_CACHE_CAPACITY)
    }
}

/// Truncate text for logging purposes
fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_length).collect();
        format!("{}...", truncated)
    }
}

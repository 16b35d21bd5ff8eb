/*!
 * Translation orchestration for subtitle documents.
 *
 * - `core`: the service that runs document passes
 * - `router`: provider fallback with retries
 * - `batch`: batch scheduling of units
 * - `cache`: scoped LRU translation cache
 * - `concurrency`: provider profiles and system-aware concurrency
 * - `retry`: exponential backoff controller
 * - `throttle`: global spacing between provider requests
 */

// Re-export main types for easier usage
pub use self::batch::{BatchOptions, BatchTranslator};
pub use self::cache::{CacheStats, TranslationCache};
pub use self::core::{CredentialReport, ProviderCheck, TranslationService};
pub use self::router::{FallbackRouter, TranslationRequest, UnitTranslator};

// Submodules
pub mod batch;
pub mod cache;
pub mod concurrency;
pub mod core;
pub mod retry;
pub mod router;
pub mod throttle;

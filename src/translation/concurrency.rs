/*!
 * Provider-specific concurrency tuning.
 *
 * Batch sizes follow each backend's throughput and quota profile, and the
 * number of batches run at once follows what the host machine can sustain.
 */

use log::{debug, info};

use crate::app_config::TranslationProvider;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Units sent to the provider per batch
    pub batch_size: usize,
    /// Upper bound on batches in flight at once
    pub max_concurrent_batches: usize,
}

impl ProviderProfile {
    /// Get the optimal profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::MyMemory => Self {
                // Free service answers quickly but rotates identities on quota
                batch_size: 10,
                max_concurrent_batches: 4,
            },
            TranslationProvider::DeepL => Self {
                batch_size: 5,
                max_concurrent_batches: 3,
            },
            TranslationProvider::OpenAI => Self {
                // Slow per request and billed per token
                batch_size: 3,
                max_concurrent_batches: 2,
            },
        }
    }

    /// Apply configured overrides
    pub fn with_overrides(mut self, batch_size: Option<usize>, max_concurrent_batches: Option<usize>) -> Self {
        if let Some(size) = batch_size.filter(|s| *s > 0) {
            self.batch_size = size;
        }
        if let Some(window) = max_concurrent_batches.filter(|w| *w > 0) {
            self.max_concurrent_batches = window;
        }
        self
    }
}

/// Memory and core count of the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemResources {
    pub total_memory_gb: u64,
    pub cpu_cores: usize,
}

impl SystemResources {
    /// Detect available system memory and logical cores
    pub fn detect() -> Self {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        // Nearest GiB
        let total_memory_gb = (sys.total_memory() + 536_870_912) / 1_073_741_824;

        let cpu_cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let resources = Self { total_memory_gb, cpu_cores };
        debug!("Detected system resources: {:?}", resources);
        resources
    }

    /// Concurrent batches this machine can comfortably drive
    pub fn recommended_concurrent_batches(&self) -> usize {
        match (self.total_memory_gb, self.cpu_cores) {
            (mem, cores) if mem >= 16 && cores >= 8 => 6,
            (mem, cores) if mem >= 8 && cores >= 4 => 4,
            (mem, _) if mem >= 4 => 2,
            _ => 1,
        }
    }
}

/// Concurrency window for a pass
pub fn concurrency_window(profile: &ProviderProfile, configured: Option<usize>, resources: &SystemResources) -> usize {
    let window = match configured.filter(|w| *w > 0) {
        Some(w) => w,
        None => resources.recommended_concurrent_batches().min(profile.max_concurrent_batches),
    };
    info!("Using {} concurrent batch(es) of up to {} units", window.max(1), profile.batch_size);
    window.max(1)
}

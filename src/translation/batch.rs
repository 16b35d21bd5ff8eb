/*!
 * Batch translation processing.
 *
 * Units are split into provider-sized batches. Batches are processed in
 * groups no larger than the concurrency window: batches inside a group run
 * concurrently, units inside a batch run one after another. Results are
 * written back by offset so the output order always matches the input order,
 * whatever order the batches complete in.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use futures::future::join_all;
use log::{debug, warn};

use crate::app_config::TranslationProvider;
use crate::progress::{preview, UnitProgress};

use super::router::{TranslationRequest, UnitTranslator};

/// Alternate providers tried for a unit in sequential mode
const MAX_ALTERNATE_PROVIDERS: usize = 2;

/// Settings for one batch pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Whether units are grouped into concurrent batches
    pub batching_enabled: bool,
    /// Units per batch
    pub batch_size: usize,
    /// Batches run concurrently
    pub concurrency_window: usize,
    /// Pause before a failed unit is retried
    pub unit_retry_delay: Duration,
    /// Pause between groups of batches
    pub inter_group_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batching_enabled: true,
            batch_size: 5,
            concurrency_window: 3,
            unit_retry_delay: Duration::from_millis(500),
            inter_group_delay: Duration::ZERO,
        }
    }
}

/// Batch translator for processing units in batches
pub struct BatchTranslator<'a> {
    /// Translator used for each unit
    translator: &'a dyn UnitTranslator,

    /// Batch settings
    options: BatchOptions,
}

impl<'a> BatchTranslator<'a> {
    /// Create a new batch translator
    pub fn new(translator: &'a dyn UnitTranslator, options: BatchOptions) -> Self {
        Self { translator, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Translate every text, returning one output per input in the same order
    ///
    /// Never fails: a unit that cannot be translated is returned unchanged.
    /// `progress` is called once per unit with a strictly increasing `current`.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        preferred: TranslationProvider,
        request: &TranslationRequest,
        progress: &(dyn Fn(UnitProgress) + Send + Sync),
    ) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        if !self.options.batching_enabled || texts.len() <= 1 {
            return self.translate_sequential(texts, preferred, request, progress).await;
        }

        self.translate_grouped(texts, preferred, request, progress).await
    }

    async fn translate_sequential(
        &self,
        texts: &[String],
        preferred: TranslationProvider,
        request: &TranslationRequest,
        progress: &(dyn Fn(UnitProgress) + Send + Sync),
    ) -> Vec<String> {
        let total = texts.len();
        let mut results = Vec::with_capacity(total);

        for (index, text) in texts.iter().enumerate() {
            let translated = match self.translator.translate_unit(text, preferred, request).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("Unit {} failed, trying alternate providers: {}", index + 1, e);
                    self.translate_with_alternates(text, preferred, request).await
                        .unwrap_or_else(|| text.clone())
                }
            };
            results.push(translated);
            progress(UnitProgress { current: index + 1, total, text_preview: preview(text) });
        }

        results
    }

    async fn translate_with_alternates(
        &self,
        text: &str,
        preferred: TranslationProvider,
        request: &TranslationRequest,
    ) -> Option<String> {
        let alternates = self.translator.alternate_providers(preferred);
        for provider in alternates.into_iter().take(MAX_ALTERNATE_PROVIDERS) {
            match self.translator.translate_with(text, provider, request).await {
                Ok(translated) => return Some(translated),
                Err(e) => warn!("Alternate provider {} failed: {}", provider.display_name(), e),
            }
        }
        None
    }

    async fn translate_grouped(
        &self,
        texts: &[String],
        preferred: TranslationProvider,
        request: &TranslationRequest,
        progress: &(dyn Fn(UnitProgress) + Send + Sync),
    ) -> Vec<String> {
        let total = texts.len();
        let batch_size = self.options.batch_size.max(1);
        let window = self.options.concurrency_window.max(1);
        let completed = AtomicUsize::new(0);

        let batches: Vec<(usize, &[String])> = texts.chunks(batch_size)
            .enumerate()
            .map(|(index, chunk)| (index * batch_size, chunk))
            .collect();
        debug!("Translating {} units in {} batches, {} at a time", total, batches.len(), window);

        let mut results: Vec<Option<String>> = vec![None; total];
        for (group_index, group) in batches.chunks(window).enumerate() {
            if group_index > 0 && !self.options.inter_group_delay.is_zero() {
                tokio::time::sleep(self.options.inter_group_delay).await;
            }

            let group_results = join_all(group.iter().map(|(offset, chunk)| {
                self.translate_one_batch(*offset, chunk, preferred, request, &completed, total, progress)
            }))
            .await;

            for (offset, translated) in group_results {
                for (k, text) in translated.into_iter().enumerate() {
                    results[offset + k] = Some(text);
                }
            }
        }

        results.into_iter()
            .zip(texts.iter())
            .map(|(translated, original)| translated.unwrap_or_else(|| original.clone()))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    async fn translate_one_batch(
        &self,
        offset: usize,
        chunk: &[String],
        preferred: TranslationProvider,
        request: &TranslationRequest,
        completed: &AtomicUsize,
        total: usize,
        progress: &(dyn Fn(UnitProgress) + Send + Sync),
    ) -> (usize, Vec<String>) {
        let mut translated = Vec::with_capacity(chunk.len());

        for (k, text) in chunk.iter().enumerate() {
            let result = match self.translator.translate_unit(text, preferred, request).await {
                Ok(t) => t,
                Err(e) => {
                    warn!("Unit {} failed, retrying once: {}", offset + k + 1, e);
                    tokio::time::sleep(self.options.unit_retry_delay).await;
                    match self.translator.translate_unit(text, preferred, request).await {
                        Ok(t) => t,
                        Err(e) => {
                            warn!("Unit {} failed again, keeping original text: {}", offset + k + 1, e);
                            text.clone()
                        }
                    }
                }
            };
            translated.push(result);

            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(UnitProgress { current, total, text_preview: preview(text) });
        }

        (offset, translated)
    }
}

use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::app_config::{Config, TranslationProvider};
use crate::credentials::Credentials;
use crate::file_utils::{FileManager, SUBTITLE_EXTENSION};
use crate::progress::{ProgressEvent, ProgressSink, ProgressStage};
use crate::translation::{CredentialReport, TranslationService};

// @module: Application controller for subtitle processing

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Translation written to this path
    Translated(PathBuf),
    /// An output already existed and overwriting was not requested
    Skipped(PathBuf),
}

/// Counts for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Progress sink backed by an `indicatif` bar
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    pub fn new(bar: ProgressBar) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self::new(ProgressBar::hidden())
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl ProgressSink for ProgressBarSink {
    fn emit(&self, event: ProgressEvent) {
        let message = event.message.clone().unwrap_or_default();
        match event.stage {
            ProgressStage::Starting => self.bar.set_message(message),
            ProgressStage::Translating => {
                if let Some(total) = event.total {
                    self.bar.set_length(total as u64);
                }
                if let Some(current) = event.current {
                    self.bar.set_position(current as u64);
                }
                self.bar.set_message(message);
            }
            ProgressStage::Completed => self.bar.finish_with_message(message),
            ProgressStage::Error => self.bar.abandon_with_message(message),
        }
    }
}

/// Main application controller for subtitle translation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Translation service shared by every run
    service: TranslationService,

    // @field: Draw progress bars on the terminal
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config, credentials: Credentials) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        let service = TranslationService::new(config.clone(), credentials);
        Ok(Self { config, service, show_progress: true })
    }

    /// Create a controller around an existing service, without progress bars
    pub fn with_service(service: TranslationService) -> Self {
        Self {
            config: service.config.clone(),
            service,
            show_progress: false,
        }
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    fn provider(&self) -> TranslationProvider {
        self.config.translation.provider
    }

    fn source_hint(&self) -> Option<&str> {
        Some(self.config.source_language.as_str())
    }

    fn progress_sink(&self, multi_progress: &MultiProgress) -> ProgressBarSink {
        if self.show_progress {
            ProgressBarSink::new(multi_progress.add(ProgressBar::new(0)))
        } else {
            ProgressBarSink::hidden()
        }
    }

    /// Translate one subtitle file
    pub async fn run(&self, input_file: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<RunOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, output_dir.as_deref(), &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: Option<&Path>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let target = &self.config.target_language;
        let output_path = match output_dir {
            Some(dir) => {
                FileManager::ensure_dir(dir)?;
                FileManager::generate_output_path_in(input_file, dir, target)
            }
            None => FileManager::generate_output_path(input_file, target),
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping {:?}, translation already exists (use -f to force overwrite)", input_file);
            return Ok(RunOutcome::Skipped(output_path));
        }

        info!(
            "Translating {} to {} with {}",
            input_file.display(),
            target,
            self.provider().display_name()
        );

        let sink = self.progress_sink(multi_progress);
        let written = self.service
            .translate_document(input_file, Some(&output_path), self.provider(), target, &sink, self.source_hint())
            .await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;

        info!("Translation completed in {}.", Self::format_duration(start_time.elapsed()));
        Ok(RunOutcome::Translated(written))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Translate every subtitle file under a directory
    /// Files that already have a translation are skipped
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let target = &self.config.target_language;
        let files: Vec<PathBuf> = FileManager::find_files(&input_dir, SUBTITLE_EXTENSION)?
            .into_iter()
            .filter(|f| !FileManager::is_translation_output(f, target))
            .collect();

        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(files.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();
        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with_progress(file, None, &multi_progress, force_overwrite).await {
                Ok(RunOutcome::Translated(_)) => summary.translated += 1,
                Ok(RunOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} translated, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Translate a single line of text with the configured provider
    pub async fn translate_text(&self, text: &str) -> String {
        self.service.translate_text(text, self.provider(), &self.config.target_language).await
    }

    /// Check stored credentials, logging each result
    pub async fn validate_credentials(&self) -> CredentialReport {
        let sink = |event: ProgressEvent| {
            if let Some(message) = event.message {
                error!("{}", message);
            }
        };
        let report = self.service.validate_credentials(&sink).await;
        for check in &report.checks {
            info!("{}: {}", check.provider.display_name(), check.message);
        }
        report
    }
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subtrans::app_config::{Config, LogLevel, TranslationProvider};
use subtrans::app_controller::{Controller, RunOutcome};
use subtrans::credentials::{CredentialStore, Credentials, JsonCredentialStore};
use subtrans::progress::ProgressEvent;
use subtrans::translation::TranslationService;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "mymemory")]
    MyMemory,
    #[value(name = "deepl")]
    DeepL,
    #[value(name = "openai", alias = "chatgpt")]
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::MyMemory => TranslationProvider::MyMemory,
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// Options shared by every subcommand
#[derive(Args, Debug)]
struct GlobalArgs {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Credential file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// DeepL API key, used in addition to the stored credentials
    #[arg(long, global = true, env = "DEEPL_API_KEY", hide_env_values = true)]
    deepl_key: Option<String>,

    /// OpenAI API key, used in addition to the stored credentials
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a subtitle file or every subtitle file in a directory
    Translate(TranslateArgs),

    /// Translate a single piece of text
    Text {
        /// Text to translate
        text: String,

        /// Translation provider to use
        #[arg(short, long, value_enum)]
        provider: Option<CliTranslationProvider>,

        /// Target language code (e.g., 'ko', 'en', 'ja')
        #[arg(short, long)]
        target_language: Option<String>,
    },

    /// Check the stored API keys against each provider
    Validate,

    /// Validate and store API keys
    Credentials {
        /// DeepL API key to store
        #[arg(long)]
        deepl: Option<String>,

        /// OpenAI API key to store
        #[arg(long)]
        openai: Option<String>,
    },

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code, or 'auto' to detect
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ko', 'en', 'ja')
    #[arg(short, long)]
    target_language: Option<String>,
}

/// subtrans - Subtitle translation orchestration
///
/// Translates the dialogue of SRT subtitle files through MyMemory, DeepL or
/// OpenAI, falling back between providers when one fails.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Subtitle translation with provider fallback")]
#[command(long_about = "subtrans translates the dialogue of SRT subtitle files while keeping sequence numbers, timings and sound cues intact.

EXAMPLES:
    subtrans translate movie.srt                     # Translate using default config
    subtrans translate -f movie.srt                  # Force overwrite existing files
    subtrans translate -p deepl -t ja movie.srt      # Use DeepL, translate to Japanese
    subtrans translate --log-level debug /movies/    # Process an entire directory
    subtrans text -t ko \"Good morning\"               # Translate a single line
    subtrans credentials --deepl KEY                 # Validate and store a DeepL key
    subtrans completions bash > subtrans.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically.

SUPPORTED PROVIDERS:
    mymemory - MyMemory translation memory (free, no key)
    deepl    - DeepL API (requires API key)
    openai   - OpenAI chat completions (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.global.config_path)?;
    if let Some(level) = &cli.global.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let store = credential_store(&cli.global)?;

    match cli.command {
        Commands::Translate(args) => {
            if let Some(provider) = args.provider.clone() {
                config.translation.provider = provider.into();
            }
            if let Some(source) = &args.source_language {
                config.source_language = source.clone();
            }
            if let Some(target) = &args.target_language {
                config.target_language = target.clone();
            }
            let credentials = load_credentials(&store, &cli.global)?;
            run_translate(config, credentials, args).await
        }
        Commands::Text { text, provider, target_language } => {
            if let Some(provider) = provider {
                config.translation.provider = provider.into();
            }
            if let Some(target) = target_language {
                config.target_language = target;
            }
            let credentials = load_credentials(&store, &cli.global)?;
            let controller = Controller::with_config(config, credentials)?;
            println!("{}", controller.translate_text(&text).await);
            Ok(())
        }
        Commands::Validate => {
            let credentials = load_credentials(&store, &cli.global)?;
            let controller = Controller::with_config(config, credentials)?;
            let report = controller.validate_credentials().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.all_valid() {
                Ok(())
            } else {
                Err(anyhow!("One or more API keys were rejected"))
            }
        }
        Commands::Credentials { deepl, openai } => {
            save_credentials(config, &store, deepl, openai).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

fn credential_store(global: &GlobalArgs) -> Result<JsonCredentialStore> {
    match &global.credentials {
        Some(path) => Ok(JsonCredentialStore::new(path.clone())),
        None => JsonCredentialStore::default_location().context("Failed to locate credential store"),
    }
}

/// Stored credentials, overlaid with keys from flags or the environment
fn load_credentials(store: &JsonCredentialStore, global: &GlobalArgs) -> Result<Credentials> {
    let mut credentials = store.load_credentials()
        .with_context(|| format!("Failed to load credentials from {:?}", store.path()))?;

    let mut overrides = Credentials::new();
    if let Some(key) = &global.deepl_key {
        overrides.set(TranslationProvider::DeepL, key.clone());
    }
    if let Some(key) = &global.openai_key {
        overrides.set(TranslationProvider::OpenAI, key.clone());
    }
    credentials.merge(&overrides);
    Ok(credentials)
}

async fn run_translate(config: Config, credentials: Credentials, args: TranslateArgs) -> Result<()> {
    let controller = Controller::with_config(config, credentials)?;

    if args.input_path.is_file() {
        match controller.run(args.input_path.clone(), args.output_dir.clone(), args.force_overwrite).await? {
            RunOutcome::Translated(path) => info!("Success: {}", path.display()),
            RunOutcome::Skipped(path) => warn!("Skipped, {} already exists", path.display()),
        }
    } else if args.input_path.is_dir() {
        let summary = controller.run_folder(args.input_path.clone(), args.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(anyhow!("{} file(s) failed to translate", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}

async fn save_credentials(
    config: Config,
    store: &JsonCredentialStore,
    deepl: Option<String>,
    openai: Option<String>,
) -> Result<()> {
    let mut candidate = Credentials::new();
    if let Some(key) = deepl {
        candidate.set(TranslationProvider::DeepL, key);
    }
    if let Some(key) = openai {
        candidate.set(TranslationProvider::OpenAI, key);
    }
    if candidate.configured_providers().is_empty() {
        return Err(anyhow!("Nothing to store: pass --deepl and/or --openai"));
    }

    let service = TranslationService::new(config, Credentials::new());
    let sink = |event: ProgressEvent| {
        if let Some(message) = event.message {
            error!("{}", message);
        }
    };
    let report = service.validate_candidate_credentials(&candidate, &sink).await;

    for provider in candidate.configured_providers() {
        if let Some(check) = report.check_for(provider) {
            if !check.valid {
                return Err(anyhow!("{} key rejected: {}", provider.display_name(), check.message));
            }
            info!("{}: {}", provider.display_name(), check.message);
        }
    }

    if store.save_credentials(&candidate).context("Failed to save credentials")? {
        info!("Credentials saved to {}", store.path().display());
    } else {
        info!("Credentials unchanged");
    }
    Ok(())
}

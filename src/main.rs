// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod markdown_writer;
mod pipeline;
mod providers;
mod resume;
mod tei_processor;
mod tei_writer;
mod xml_tree;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate TEI documents using a local AI engine (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for yattai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input TEI file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory, or output XML file for single-file input
    #[arg(short, long, value_name = "OUTPUT_PATH")]
    output: Option<PathBuf>,

    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Endpoint URL of the local inference server
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Max generated tokens per segment
    #[arg(long)]
    max_tokens: Option<u32>,

    /// TEI output strategy, currently: note
    #[arg(long)]
    tei_strategy: Option<String>,

    /// Also write sidecar Markdown output (*.en.md)
    #[arg(long)]
    emit_markdown: bool,

    /// Disable progress bar output
    #[arg(long)]
    no_progress: bool,

    /// Always reprocess files even if output looks complete
    #[arg(long)]
    no_resume: bool,

    /// Replace existing translation notes while writing
    #[arg(long)]
    overwrite_existing_translations: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// YATTAI - Yet Another TEI Translator with AI
///
/// Translates TEI-encoded historical texts with a local AI engine, writing
/// the results back into the documents as translation notes.
#[derive(Parser, Debug)]
#[command(name = "yattai")]
#[command(author = "YATTAI Team")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered TEI document translation tool")]
#[command(long_about = "YATTAI segments TEI XML documents, translates each unit with a local AI \
engine, and annotates the documents with the results.

EXAMPLES:
    yattai corpus/ -o translated/            # Translate a whole directory tree
    yattai sutra.xml -o out/sutra.xml        # Translate one file to an exact path
    yattai corpus/ -o out/ --emit-markdown   # Also write *.en.md review files
    yattai corpus/ -o out/ --no-resume       # Reprocess complete outputs too
    yattai corpus/ -o out/ -w 8              # Use 8 worker threads
    yattai completions bash > yattai.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, record.level(), record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yattai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args),
        None => run_translate(cli.translate),
    }
}

fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required"))?;
    let output_path = options
        .output
        .clone()
        .ok_or_else(|| anyhow!("--output is required"))?;

    let config = load_config(&options)?;

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&input_path, &output_path)?;

    // Per-file failures are reported in the summary; only fatal setup
    // errors make the process exit non-zero.
    if summary.failed > 0 {
        warn!("{} of {} file(s) failed", summary.failed, summary.files);
    }

    Ok(())
}

/// Load the config file (creating a default one when missing) and apply the
/// CLI overrides on top.
fn load_config(options: &TranslateArgs) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        file_utils::FileManager::write_to_file(config_path, &config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(workers) = options.workers {
        config.processing.workers = workers;
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if let Some(max_tokens) = options.max_tokens {
        config.translation.max_tokens = max_tokens;
    }
    if let Some(strategy) = &options.tei_strategy {
        config.processing.tei_strategy = strategy.clone();
    }
    if options.emit_markdown {
        config.processing.emit_markdown = true;
    }
    if options.no_progress {
        config.processing.show_progress = false;
    }
    if options.no_resume {
        config.processing.resume = false;
    }
    if options.overwrite_existing_translations {
        config.processing.overwrite_existing_translations = true;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

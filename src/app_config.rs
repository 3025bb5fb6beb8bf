use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code of the documents (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation engine config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Document processing config
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation engine settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Service endpoint URL of the local inference server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name (e.g., "qwen2.5:7b")
    #[serde(default = "default_model")]
    pub model: String,

    /// Max generated tokens per segment
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Document processing settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessingConfig {
    /// Worker threads; 0 means available parallelism
    #[serde(default)]
    pub workers: usize,

    /// Skip files whose output already looks complete
    #[serde(default = "default_true")]
    pub resume: bool,

    /// Replace existing translation notes instead of leaving them in place
    #[serde(default)]
    pub overwrite_existing_translations: bool,

    /// Also write a sidecar Markdown rendering
    #[serde(default)]
    pub emit_markdown: bool,

    /// Show the progress bar
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// TEI output strategy, currently only "note"
    #[serde(default = "default_tei_strategy")]
    pub tei_strategy: String,
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "lzh".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_max_tokens() -> u32 {
    192
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_tei_strategy() -> String {
    "note".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            resume: true,
            overwrite_existing_translations: false,
            emit_markdown: false,
            show_progress: true,
            tei_strategy: default_tei_strategy(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            processing: ProcessingConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ProcessingConfig {
    /// Worker count with 0 resolved to the machine's available parallelism
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

impl Config {
    /// Validate the merged configuration before running
    pub fn validate(&self) -> Result<()> {
        if self.processing.tei_strategy != "note" {
            return Err(anyhow!(
                "Unsupported tei_strategy: {} (supported: note)",
                self.processing.tei_strategy
            ));
        }
        if self.translation.endpoint.is_empty() {
            return Err(anyhow!("Translation endpoint must not be empty"));
        }
        if self.translation.model.is_empty() {
            return Err(anyhow!("Translation model must not be empty"));
        }
        if self.translation.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be at least 1"));
        }
        if self.source_language.is_empty() || self.target_language.is_empty() {
            return Err(anyhow!("Language codes must not be empty"));
        }
        Ok(())
    }
}

use std::sync::OnceLock;
use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::Translator;
use crate::tei_processor::Segment;

/// Instruction prepended to every request. The engine is expected to answer
/// with the English rendering alone.
const SYSTEM_PROMPT: &str = "Translate the following Classical Chinese passage into natural English.\nOutput English only. Do not explain.";

/// Endpoint reachability is checked once per process, not once per clone.
static PREFLIGHT: OnceLock<Result<(), String>> = OnceLock::new();

/// Configuration for the Ollama engine
#[derive(Debug, Clone)]
pub struct OllamaTranslatorConfig {
    /// Base URL of the Ollama API
    pub endpoint: String,
    /// Model name to use for generation
    pub model: String,
    /// Maximum generated tokens per segment
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    /// Model name to use for generation
    model: &'a str,
    /// Prompt to generate from
    prompt: &'a str,
    /// System message to guide the model
    system: &'a str,
    /// Whether to stream the response
    stream: bool,
    /// Additional model parameters
    options: GenerationOptions,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationOptions {
    /// Maximum number of tokens to generate
    num_predict: u32,
    /// Temperature for generation
    temperature: f32,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    /// Generated text
    response: String,
}

/// Translator backed by a local Ollama inference server
#[derive(Debug)]
pub struct OllamaTranslator {
    config: OllamaTranslatorConfig,
    client: Client,
}

impl OllamaTranslator {
    /// Create a translator and verify the endpoint is reachable.
    ///
    /// The reachability check runs once per process; clones reuse the
    /// cached outcome.
    pub fn new(config: OllamaTranslatorConfig) -> Result<Self, ProviderError> {
        let translator = Self::with_config(config)?;

        let check = PREFLIGHT.get_or_init(|| translator.check_connection());
        if let Err(message) = check {
            return Err(ProviderError::RequestFailed(message.clone()));
        }

        Ok(translator)
    }

    fn with_config(config: OllamaTranslatorConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(OllamaTranslator { config, client })
    }

    fn check_connection(&self) -> Result<(), String> {
        let url = format!("{}/api/version", self.config.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| format!("Ollama endpoint not reachable at {}: {}", self.config.endpoint, e))?;

        if !response.status().is_success() {
            return Err(format!(
                "Ollama endpoint returned status {} at {}",
                response.status(),
                self.config.endpoint
            ));
        }

        debug!("Ollama endpoint reachable at {}", self.config.endpoint);
        Ok(())
    }

    /// Strip prompt echo and trailing chatter from a raw model response
    fn postprocess_translation(&self, text: &str) -> String {
        let mut text = text.replace('\r', "");

        if let Some(pos) = text.find("English:") {
            text = text[pos + "English:".len()..].to_string();
        }

        if let Some(pos) = text.find("\n\n") {
            text.truncate(pos);
        }

        text.trim().to_string()
    }
}

impl Translator for OllamaTranslator {
    fn clone_box(&self) -> Result<Box<dyn Translator>, ProviderError> {
        let clone = Self::with_config(self.config.clone())
            .map_err(|e| ProviderError::CloneFailed(e.to_string()))?;
        Ok(Box::new(clone))
    }

    fn translate(&mut self, segment: &Segment) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let request = GenerationRequest {
            model: &self.config.model,
            prompt: &segment.source_text,
            system: SYSTEM_PROMPT,
            stream: false,
            options: GenerationOptions {
                num_predict: self.config.max_tokens.max(1),
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| ProviderError::RequestFailed(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        let generation: GenerationResponse = response
            .json()
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(self.postprocess_translation(&generation.response))
    }
}

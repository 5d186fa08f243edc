//! Model Provider Abstraction
//!
//! Defines the `ModelProvider` trait: a text-in/text-out completion capability
//! used by every pipeline stage. Providers report token usage and cost with
//! each completion so stages can account for them.
//!
//! ## Modules
//!
//! - `openai`: OpenAI-compatible Chat Completions API
//! - `ollama`: locally running Ollama models

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{Cost, DraftError, Result};

// =============================================================================
// Completion Request / Response
// =============================================================================

/// One text completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction describing the role the model plays
    pub system: String,
    /// User prompt
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Short call label for logs, e.g. "section:Introduction" or "agent:seo"
    pub label: String,
}

impl CompletionRequest {
    pub fn new(label: impl Into<String>, system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_output_tokens: 4096,
            temperature: 0.7,
            label: label.into(),
        }
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Provider output including usage metrics and actual cost
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
    pub cost: Cost,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl Completion {
    /// Completion with text only (usage and cost unknown)
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: TokenUsage::default(),
            cost: Cost::ZERO,
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn with_metrics(
        text: String,
        usage: TokenUsage,
        cost: Cost,
        timing: ResponseTiming,
        metadata: ResponseMetadata,
    ) -> Self {
        Self {
            text,
            usage,
            cost,
            timing,
            metadata,
        }
    }
}

/// Token usage metrics for cost tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Response timing metrics
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    /// Wall-clock time in milliseconds
    pub total_ms: u64,
    /// Processing time reported by the provider, if any
    pub api_ms: Option<u64>,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
            api_ms: None,
        }
    }

    pub fn with_api_time(duration: std::time::Duration, api_ms: Option<u64>) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
            api_ms,
        }
    }
}

/// Response metadata
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared provider handle for concurrent access across pipeline stages
pub type SharedProvider = Arc<dyn ModelProvider>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Supported provider backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Ollama,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            _ => Err(format!("Unknown provider: {}. Supported: openai, ollama", s)),
        }
    }
}

/// Configuration for model providers
///
/// API keys are never serialized and are redacted in debug output. Each
/// provider wraps the key in `SecretString` at construction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Per-request HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound on output tokens for any single call
    pub max_output_tokens: u32,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    /// USD per million input tokens
    pub input_price_per_mtok: f64,
    /// USD per million output tokens
    pub output_price_per_mtok: f64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("input_price_per_mtok", &self.input_price_per_mtok)
            .field("output_price_per_mtok", &self.output_price_per_mtok)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: None,
            timeout_secs: crate::constants::network::DEFAULT_TIMEOUT_SECS,
            max_output_tokens: 4096,
            api_key: None,
            api_base: None,
            input_price_per_mtok: 0.0,
            output_price_per_mtok: 0.0,
        }
    }
}

// =============================================================================
// Model Provider Trait
// =============================================================================

/// Text completion capability with usage metrics
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Complete one request.
    ///
    /// Failures are reported as `DraftError::Provider` with a category so the
    /// caller can decide whether to retry.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
    }
}

/// Validate a provider base URL: http(s) only, trailing slash removed
pub(crate) fn normalize_endpoint(endpoint: &str, provider: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        DraftError::Config(format!("Invalid {} endpoint URL '{}': {}", provider, endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DraftError::Config(format!(
            "{} endpoint must use http or https scheme, got: {}",
            provider,
            url.scheme()
        )));
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

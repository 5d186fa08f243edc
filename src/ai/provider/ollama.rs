//! Ollama Local Model Provider
//!
//! Completion provider for locally running Ollama models. Local inference is
//! free, so cost is always zero; token counts come from the eval counters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    Completion, CompletionRequest, ModelProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, TokenUsage, normalize_endpoint,
};
use crate::constants::network::CONNECTION_TIMEOUT_SECS;
use crate::types::{
    Cost, DraftError, ErrorCategory, ErrorClassifier, ProviderError, Result, utils::estimate_tokens,
};

const PROVIDER_NAME: &str = "ollama";
const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";

/// Ollama Local Model Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    max_output_tokens: u32,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = normalize_endpoint(
            config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE),
            PROVIDER_NAME,
        )?;

        if let Ok(url) = url::Url::parse(&api_base)
            && let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| DraftError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }

    fn build_request(&self, request: &CompletionRequest) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_output_tokens.min(self.max_output_tokens),
            },
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        info!(
            label = %request.label,
            model = %self.model,
            "Requesting completion from Ollama"
        );

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/api/generate", self.api_base);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let mut err = ErrorClassifier::classify_transport(&e, PROVIDER_NAME);
                if e.is_connect() {
                    err.message = format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    );
                }
                err
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, text),
                PROVIDER_NAME,
            )
            .into());
        }

        let response_body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER_NAME))?;

        if response_body.response.trim().is_empty() {
            return Err(ProviderError::with_provider(
                ErrorCategory::ParseError,
                "Empty response from Ollama",
                PROVIDER_NAME,
            )
            .into());
        }

        // Older Ollama builds omit eval counters
        let usage = TokenUsage::new(
            response_body
                .prompt_eval_count
                .unwrap_or_else(|| estimate_tokens(&request.prompt)),
            response_body
                .eval_count
                .unwrap_or_else(|| estimate_tokens(&response_body.response)),
        );

        debug!(
            label = %request.label,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            elapsed_ms = elapsed.as_millis() as u64,
            "Ollama completion received"
        );

        Ok(Completion::with_metrics(
            response_body.response,
            usage,
            Cost::ZERO,
            ResponseTiming::with_api_time(
                elapsed,
                response_body.total_duration.map(|ns| ns / 1_000_000),
            ),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.api_base);

        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let Ok(tags) = resp.json::<OllamaTagsResponse>().await else {
                    info!("Ollama is available");
                    return Ok(true);
                };
                let base = self.model.trim_end_matches(":latest");
                let model_available = tags
                    .models
                    .iter()
                    .any(|m| m.name == self.model || m.name.starts_with(base));

                if model_available {
                    info!("Ollama is available with model: {}", self.model);
                    Ok(true)
                } else {
                    warn!(
                        "Ollama is running but model '{}' not found. Pull with: ollama pull {}",
                        self.model, self.model
                    );
                    Ok(false)
                }
            }
            Ok(resp) => {
                warn!("Ollama API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Ollama not available: {}. Start with: ollama serve", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    system: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    /// Nanoseconds
    #[serde(default)]
    total_duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;

    #[test]
    fn test_default_config() {
        let config = ProviderConfig {
            provider: ProviderKind::Ollama,
            ..Default::default()
        };

        let provider = OllamaProvider::new(config).expect("Failed to create provider");
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_build_request_carries_system_and_limits() {
        let provider = OllamaProvider::new(ProviderConfig {
            provider: ProviderKind::Ollama,
            max_output_tokens: 1000,
            ..Default::default()
        })
        .unwrap();
        let req = CompletionRequest::new("revision", "You are an editor", "Fix this")
            .with_max_output_tokens(4000);
        let body = provider.build_request(&req);
        assert_eq!(body.system, "You are an editor");
        assert_eq!(body.options.num_predict, 1000);
        assert!(!body.stream);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let result = OllamaProvider::new(ProviderConfig {
            provider: ProviderKind::Ollama,
            api_base: Some("file:///etc/passwd".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}

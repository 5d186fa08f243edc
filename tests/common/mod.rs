//! Scripted model provider for end-to-end pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use draftsmith::ai::{Completion, CompletionRequest, ResponseMetadata, ResponseTiming, TokenUsage};
use draftsmith::types::ErrorCategory;
use draftsmith::{Cost, DraftError, ModelProvider, Result};

pub const CALL_COST_MICROS: u64 = 2_000;

/// Replies chosen by request-label prefix; first matching rule wins
pub struct ScriptedProvider {
    rules: Vec<(String, String)>,
    fail_prefix: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fail_prefix: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, prefix: &str, reply: impl Into<String>) -> Self {
        self.rules.push((prefix.to_string(), reply.into()));
        self
    }

    /// Every critique agent returns `score`
    pub fn agents_score(self, score: f32) -> Self {
        self.on("agent:", agent_reply(score))
    }

    pub fn fail_on(mut self, prefix: &str) -> Self {
        self.fail_prefix = Some(prefix.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

pub fn agent_reply(score: f32) -> String {
    format!(
        r#"{{"score": {}, "strengths": ["clear"], "weaknesses": ["thin examples"], "improvements": ["add an example"], "reasoning": "ok"}}"#,
        score
    )
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.lock().unwrap().push(request.label.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(prefix) = &self.fail_prefix
            && request.label.starts_with(prefix.as_str())
        {
            return Err(DraftError::provider(ErrorCategory::Network, "connection reset"));
        }

        let text = self
            .rules
            .iter()
            .find(|(prefix, _)| request.label.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| format!("Plain text written for {}.", request.label));

        Ok(Completion::with_metrics(
            text,
            TokenUsage::new(200, 100),
            Cost::from_micros(CALL_COST_MICROS),
            ResponseTiming::default(),
            ResponseMetadata {
                model: "scripted-1".into(),
                provider: "scripted".into(),
            },
        ))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

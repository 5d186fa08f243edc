//! Draft Generation
//!
//! Two generators implement the `Generator` trait:
//!
//! - `SinglePassGenerator`: one provider call for the whole document
//! - `ChunkedGenerator`: one provider call per planned section, assembled in
//!   plan order
//!
//! Both fail the whole draft when any provider call fails after retries.
//! Word counts are always measured on the final content.

mod chunked;
pub mod prompts;
mod single_pass;

pub use chunked::ChunkedGenerator;
pub use single_pass::SinglePassGenerator;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::context::RunContext;
use crate::ai::provider::{Completion, ModelProvider};
use crate::config::Config;
use crate::constants::generation;
use crate::types::{
    Cost, DraftMetadata, GeneratedDraft, GenerationMode, GenerationRequest, Result, SectionOutput,
    word_count,
};

/// Produces an unreviewed draft from a request
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest, ctx: &RunContext) -> Result<GeneratedDraft>;

    fn mode(&self) -> GenerationMode;
}

pub type SharedGenerator = Arc<dyn Generator>;

/// Sampling and concurrency settings shared by both generators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSettings {
    pub temperature: f32,
    /// Provider-wide cap on output tokens per call
    pub max_output_tokens: u32,
    /// Sections in flight at once (chunked mode only)
    pub section_concurrency: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            temperature: generation::TEMPERATURE,
            max_output_tokens: 4096,
            section_concurrency: generation::DEFAULT_SECTION_CONCURRENCY,
        }
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.pipeline.temperature,
            max_output_tokens: config.llm.max_output_tokens,
            section_concurrency: config.pipeline.section_concurrency.max(1),
        }
    }
}

// =============================================================================
// Draft Assembly
// =============================================================================

/// Sums usage across the provider calls that produced one draft
struct DraftTally {
    input_tokens: u64,
    output_tokens: u64,
    cost: Cost,
    calls: u32,
    model: String,
    provider: String,
}

impl DraftTally {
    fn new(provider: &dyn ModelProvider) -> Self {
        Self {
            input_tokens: 0,
            output_tokens: 0,
            cost: Cost::ZERO,
            calls: 0,
            model: provider.model().to_string(),
            provider: provider.name().to_string(),
        }
    }

    fn add(&mut self, completion: &Completion) {
        self.input_tokens += completion.usage.input_tokens as u64;
        self.output_tokens += completion.usage.output_tokens as u64;
        self.cost += completion.cost;
        self.calls += 1;
        if !completion.metadata.model.is_empty() {
            self.model = completion.metadata.model.clone();
        }
    }

    fn into_draft(
        self,
        content: String,
        mode: GenerationMode,
        sections: Vec<SectionOutput>,
    ) -> GeneratedDraft {
        GeneratedDraft {
            metadata: DraftMetadata {
                word_count: word_count(&content),
                input_tokens: self.input_tokens,
                output_tokens: self.output_tokens,
                cost: self.cost,
                model: self.model,
                provider: self.provider,
                mode,
                calls: self.calls,
                generated_at: Utc::now(),
                quality_score: None,
                plan_bounds: None,
            },
            content,
            sections,
        }
    }
}

/// Drop a leading heading the model echoed despite instructions
pub(crate) fn strip_echoed_heading(text: &str, title: &str) -> String {
    let trimmed = text.trim();
    let mut lines = trimmed.lines();

    if let Some(first) = lines.next()
        && first.trim_start().starts_with('#')
        && first
            .trim_start_matches('#')
            .trim()
            .trim_matches(|c| c == '*' || c == ':')
            .eq_ignore_ascii_case(title)
    {
        return lines.collect::<Vec<_>>().join("\n").trim().to_string();
    }

    trimmed.to_string()
}

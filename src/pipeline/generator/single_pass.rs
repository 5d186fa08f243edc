//! Single-pass generation: the whole document in one provider call.
//!
//! The response text is kept byte for byte as the draft content.

use async_trait::async_trait;
use std::time::Instant;
use tracing::info;

use super::prompts::{max_tokens_for, single_pass_prompt, system_prompt};
use super::{DraftTally, Generator, GeneratorSettings};
use crate::ai::provider::{CompletionRequest, SharedProvider};
use crate::ai::usage::Stage;
use crate::pipeline::context::RunContext;
use crate::pipeline::events::PipelineEvent;
use crate::types::{DraftError, GeneratedDraft, GenerationMode, GenerationRequest, Result};

pub struct SinglePassGenerator {
    provider: SharedProvider,
    settings: GeneratorSettings,
}

impl SinglePassGenerator {
    pub fn new(provider: SharedProvider, settings: GeneratorSettings) -> Self {
        Self { provider, settings }
    }
}

#[async_trait]
impl Generator for SinglePassGenerator {
    async fn generate(&self, request: &GenerationRequest, ctx: &RunContext) -> Result<GeneratedDraft> {
        let start = Instant::now();
        ctx.emit(PipelineEvent::StageStarted {
            invocation: ctx.invocation_id(),
            stage: Stage::Generation,
        });

        let completion_request =
            CompletionRequest::new("draft", system_prompt(request), single_pass_prompt(request))
                .with_max_output_tokens(max_tokens_for(
                    request.target_words,
                    self.settings.max_output_tokens,
                ))
                .with_temperature(self.settings.temperature);

        let completion = ctx
            .complete(self.provider.as_ref(), &completion_request, Stage::Generation)
            .await?;

        if completion.text.trim().is_empty() {
            return Err(DraftError::pipeline_recoverable(
                "generation",
                "provider returned an empty draft",
            ));
        }

        let mut tally = DraftTally::new(self.provider.as_ref());
        tally.add(&completion);
        let draft = tally.into_draft(
            completion.text.clone(),
            GenerationMode::SinglePass,
            Vec::new(),
        );

        info!(
            topic = %request.topic,
            words = draft.metadata.word_count,
            target = request.target_words,
            "Single-pass draft generated"
        );
        ctx.emit(PipelineEvent::StageCompleted {
            invocation: ctx.invocation_id(),
            stage: Stage::Generation,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        Ok(draft)
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::SinglePass
    }
}

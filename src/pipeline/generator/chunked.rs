//! Chunked generation: one provider call per planned section.
//!
//! Sections run through an ordered buffer, so up to `section_concurrency`
//! calls are in flight while outputs still come back in plan order. The
//! first failure drops the remaining in-flight calls and fails the draft.
//!
//! The assembled length is checked against the plan's aggregate bounds
//! widened by `SECTION_BOUNDS_TOLERANCE` (25%) and recorded in
//! `DraftMetadata::plan_bounds`. Missing them is logged, not an error.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt, TryStreamExt, stream};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::prompts::{max_tokens_for, section_prompt, system_prompt};
use super::{DraftTally, Generator, GeneratorSettings, strip_echoed_heading};
use crate::ai::provider::{Completion, CompletionRequest, SharedProvider};
use crate::ai::usage::Stage;
use crate::constants::generation::SECTION_BOUNDS_TOLERANCE;
use crate::pipeline::context::RunContext;
use crate::pipeline::events::PipelineEvent;
use crate::pipeline::sections::SectionPlanner;
use crate::types::{
    DraftError, GeneratedDraft, GenerationMode, GenerationRequest, Result, SectionOutput,
    SectionPlan, SectionSpec, assemble_sections,
};

pub struct ChunkedGenerator {
    provider: SharedProvider,
    planner: SectionPlanner,
    settings: GeneratorSettings,
}

impl ChunkedGenerator {
    pub fn new(provider: SharedProvider, planner: SectionPlanner, settings: GeneratorSettings) -> Self {
        Self {
            provider,
            planner,
            settings,
        }
    }

    /// Resolve the plan for a request.
    ///
    /// Explicit sections are used as given. Content-type plans are rescaled
    /// so their midpoint total matches the requested length.
    pub fn resolve_plan(&self, request: &GenerationRequest) -> Result<SectionPlan> {
        let plan = self.planner.plan(request);
        plan.validate()?;

        let plan = if request.sections.is_some() {
            plan
        } else {
            plan.scaled_to(request.target_words)
        };

        let aggregate = plan.aggregate_bounds().widened(SECTION_BOUNDS_TOLERANCE);
        if !aggregate.contains(request.target_words as usize) {
            warn!(
                target_words = request.target_words,
                plan = %plan.aggregate_bounds(),
                "Section plan does not cover the requested length"
            );
        }

        Ok(plan)
    }

    async fn generate_section(
        &self,
        request: &GenerationRequest,
        section: &SectionSpec,
        index: usize,
        outline: &[&str],
        ctx: &RunContext,
    ) -> Result<(SectionOutput, Completion)> {
        let completion_request = CompletionRequest::new(
            format!("section:{}", section.title),
            system_prompt(request),
            section_prompt(request, section, index, outline),
        )
        .with_max_output_tokens(max_tokens_for(
            section.max_words,
            self.settings.max_output_tokens,
        ))
        .with_temperature(self.settings.temperature);

        let completion = ctx
            .complete(self.provider.as_ref(), &completion_request, Stage::Generation)
            .await?;

        let body = strip_echoed_heading(&completion.text, &section.title);
        if body.is_empty() {
            return Err(DraftError::pipeline_recoverable(
                "generation",
                format!("section '{}' came back empty", section.title),
            ));
        }

        let output = SectionOutput::new(index, section.title.clone(), body);
        if !section.bounds().contains(output.word_count) {
            debug!(
                section = %section.title,
                words = output.word_count,
                bounds = %section.bounds(),
                "Section length outside its bounds"
            );
        }

        ctx.emit(PipelineEvent::SectionCompleted {
            invocation: ctx.invocation_id(),
            index,
            total: outline.len(),
            title: section.title.clone(),
            words: output.word_count,
        });

        Ok((output, completion))
    }
}

#[async_trait]
impl Generator for ChunkedGenerator {
    async fn generate(&self, request: &GenerationRequest, ctx: &RunContext) -> Result<GeneratedDraft> {
        let start = Instant::now();
        ctx.emit(PipelineEvent::StageStarted {
            invocation: ctx.invocation_id(),
            stage: Stage::Generation,
        });

        let plan = self.resolve_plan(request)?;
        let outline = plan.titles();
        let concurrency = self.settings.section_concurrency.max(1);

        debug!(
            sections = plan.len(),
            concurrency,
            "Generating chunked draft"
        );

        let pending: Vec<BoxFuture<'_, Result<(SectionOutput, Completion)>>> = plan
            .iter()
            .enumerate()
            .map(|(index, section)| {
                self.generate_section(request, section, index, &outline, ctx)
                    .boxed()
            })
            .collect();
        let results: Vec<(SectionOutput, Completion)> = stream::iter(pending)
            .buffered(concurrency)
            .try_collect()
            .await?;

        let mut tally = DraftTally::new(self.provider.as_ref());
        let mut sections = Vec::with_capacity(results.len());
        for (output, completion) in results {
            tally.add(&completion);
            sections.push(output);
        }

        let content = assemble_sections(&sections);
        let mut draft = tally.into_draft(content, GenerationMode::Chunked, sections);

        let bounds = plan.aggregate_bounds().widened(SECTION_BOUNDS_TOLERANCE);
        draft.metadata.plan_bounds = Some(bounds);
        if !bounds.contains(draft.metadata.word_count) {
            warn!(
                words = draft.metadata.word_count,
                bounds = %bounds,
                "Assembled draft outside the section plan bounds"
            );
        }

        info!(
            topic = %request.topic,
            sections = draft.sections.len(),
            words = draft.metadata.word_count,
            target = request.target_words,
            "Chunked draft generated"
        );
        ctx.emit(PipelineEvent::StageCompleted {
            invocation: ctx.invocation_id(),
            stage: Stage::Generation,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        Ok(draft)
    }

    fn mode(&self) -> GenerationMode {
        GenerationMode::Chunked
    }
}

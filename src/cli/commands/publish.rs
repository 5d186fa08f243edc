//! Publish Command
//!
//! Full pipeline: generate, review, then gate for publishing.
//!
//! Usage:
//!   draftsmith publish "Async Rust" [--strategy thorough] [--output post.md] [--format json]

use std::path::PathBuf;

use super::{block_on_with_progress, emit};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, OutputFormat, RequestOptions};
use crate::pipeline::PipelineFacade;
use crate::types::{DraftError, Result};

#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    pub request: RequestOptions,
    pub overrides: ConfigOverrides,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Fail the command when the result is not publish-ready
    pub strict: bool,
    pub show_progress: bool,
}

pub fn run(options: PublishOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.overrides)?;
    let request = options.request.into_request()?;
    let facade = PipelineFacade::from_config(&ctx.config)?;

    let out = Output::new();
    out.header(&format!(
        "Publishing \"{}\" ({} strategy)",
        request.topic,
        facade.strategy()
    ));

    let outcome = block_on_with_progress(
        &ctx,
        &facade,
        options.show_progress,
        facade.generate_and_publish_with(&request, &ctx.cancel),
    )?;

    out.publish(&outcome.result);
    out.usage(&outcome.usage);

    emit(
        options.format,
        &outcome.result.final_content,
        &outcome,
        options.output.as_deref(),
    )?;

    if options.strict && !outcome.result.publish_ready {
        let reasons: Vec<String> = outcome.result.blockers.iter().map(|b| b.to_string()).collect();
        return Err(DraftError::pipeline(
            "publish",
            format!("not publish-ready: {}", reasons.join("; ")),
        ));
    }
    Ok(())
}

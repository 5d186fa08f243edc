//! Review Command
//!
//! Run the critique panel (and revision loop) over an existing Markdown file.
//!
//! Usage:
//!   draftsmith review post.md [--topic "Async Rust"] [--output revised.md]

use std::path::PathBuf;

use super::{block_on_with_progress, emit};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, OutputFormat, RequestOptions, read_input};
use crate::pipeline::PipelineFacade;
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    pub input: PathBuf,
    /// Request context; an empty topic falls back to the file stem
    pub request: RequestOptions,
    pub overrides: ConfigOverrides,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub show_progress: bool,
}

pub fn run(options: ReviewOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.overrides)?;
    let content = read_input(&options.input)?;

    let mut request_options = options.request;
    if request_options.topic.trim().is_empty() {
        request_options.topic = options
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .replace(['-', '_'], " ");
    }
    let request = request_options.into_request()?;
    let facade = PipelineFacade::from_config(&ctx.config)?;

    let reviewed = block_on_with_progress(
        &ctx,
        &facade,
        options.show_progress,
        facade.review_content(&content, &request, &ctx.cancel),
    )?;

    let out = Output::new();
    out.review(&reviewed.review);
    out.usage(&reviewed.usage);

    // Markdown output is only useful when something changed or was asked for
    if options.output.is_some()
        || options.format == OutputFormat::Json
        || reviewed.review.was_revised()
    {
        emit(
            options.format,
            &reviewed.review.final_content,
            &reviewed,
            options.output.as_deref(),
        )?;
    }
    Ok(())
}

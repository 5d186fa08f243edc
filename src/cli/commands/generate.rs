//! Generate Command
//!
//! Draft only, no review.
//!
//! Usage:
//!   draftsmith generate "Async Rust" [--content-type tutorial] [--words 1200] [--quick]

use std::path::PathBuf;

use tracing::info;

use super::{block_on_with_progress, emit};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides, OutputFormat, RequestOptions};
use crate::pipeline::PipelineFacade;
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub request: RequestOptions,
    pub overrides: ConfigOverrides,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    /// Single-pass draft regardless of strategy
    pub quick: bool,
    pub show_progress: bool,
}

pub fn run(options: GenerateOptions) -> Result<()> {
    let ctx = CommandContext::load(&options.overrides)?;
    let request = options.request.into_request()?;
    let facade = PipelineFacade::from_config(&ctx.config)?;

    info!(topic = %request.topic, quick = options.quick, "Generating draft");

    let draft = block_on_with_progress(&ctx, &facade, options.show_progress, async {
        if options.quick {
            facade.quick_draft_with(&request, &ctx.cancel).await
        } else {
            facade.generate_with(&request, &ctx.cancel).await
        }
    })?;

    let out = Output::new();
    out.section("Draft");
    out.field("Mode", draft.metadata.mode);
    out.field("Words", draft.metadata.word_count);
    out.field("Calls", draft.metadata.calls);
    out.field("Tokens", draft.metadata.tokens_used());
    out.field("Cost", draft.metadata.cost);

    emit(options.format, &draft.content, &draft, options.output.as_deref())
}

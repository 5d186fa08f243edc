//! Command handlers
//!
//! Each handler resolves config, builds a `PipelineFacade` and blocks on one
//! workflow. Content goes to stdout or `--output`; progress and summaries go
//! to stderr.

pub mod check;
pub mod config;
pub mod generate;
pub mod plan;
pub mod publish;
pub mod review;

use std::future::Future;
use std::path::Path;

use serde::Serialize;

use super::progress::ProgressRenderer;
use super::ui::Output;
use super::util::{CommandContext, OutputFormat, write_output};
use crate::pipeline::PipelineFacade;
use crate::types::Result;

/// Run `work` on the command runtime while rendering facade events
fn block_on_with_progress<T, F>(
    ctx: &CommandContext,
    facade: &PipelineFacade,
    show_progress: bool,
    work: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ctx.runtime.block_on(async {
        let renderer = show_progress.then(|| ProgressRenderer::new().spawn(facade.subscribe()));
        let result = work.await;
        if let Some(handle) = renderer {
            // Let queued events print before stopping
            tokio::task::yield_now().await;
            handle.abort();
        }
        result
    })
}

/// Emit content as Markdown or the full outcome as JSON, to a file or stdout
fn emit<T: Serialize>(
    format: OutputFormat,
    markdown: &str,
    outcome: &T,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = match format {
        OutputFormat::Markdown => markdown.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(outcome)?,
    };

    match output {
        Some(path) => {
            write_output(path, &rendered)?;
            Output::new().success(&format!("Wrote {}", path.display()));
        }
        None => println!("{}", rendered.trim_end()),
    }
    Ok(())
}

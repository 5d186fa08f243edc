//! Check Command
//!
//! Verify the configured provider is reachable before spending a run on it.
//!
//! Usage:
//!   draftsmith check [--provider ollama] [--model llama3.1]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, ConfigOverrides};
use crate::pipeline::PipelineFacade;
use crate::types::{DraftError, Result};

pub fn run(overrides: &ConfigOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let facade = PipelineFacade::from_config(&ctx.config)?;
    let out = Output::new();

    out.field("Provider", ctx.config.llm.provider);
    out.field("Strategy", facade.strategy());

    if ctx.runtime.block_on(facade.check_provider())? {
        out.success("Provider is healthy");
        Ok(())
    } else {
        Err(DraftError::Config(format!(
            "Provider '{}' is not reachable or the model is missing",
            ctx.config.llm.provider
        )))
    }
}

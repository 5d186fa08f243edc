//! Plan Command
//!
//! Show the section plan a content type resolves to. No provider calls.
//!
//! Usage:
//!   draftsmith plan tutorial [--words 1500] [--format json]
//!   draftsmith plan --list

use crate::cli::ui::Output;
use crate::cli::util::{ConfigOverrides, OutputFormat, load_config};
use crate::pipeline::SectionPlanner;
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub content_type: Option<String>,
    /// Scale the plan to this total
    pub words: Option<u32>,
    pub list: bool,
    pub format: OutputFormat,
    pub overrides: ConfigOverrides,
}

pub fn run(options: PlanOptions) -> Result<()> {
    let config = load_config(&options.overrides)?;
    let planner = SectionPlanner::with_overrides(&config.content_types);
    let out = Output::new();

    if options.list || options.content_type.is_none() {
        let types = planner.content_types();
        match options.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&types)?),
            OutputFormat::Markdown => {
                out.section("Content types");
                for key in types {
                    println!("{}", key);
                }
            }
        }
        return Ok(());
    }

    let content_type = options.content_type.unwrap_or_default();
    let mut plan = planner.plan_for(&content_type);
    if let Some(words) = options.words {
        plan = plan.scaled_to(words);
    }
    plan.validate()?;

    match options.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Markdown => out.plan(&content_type, &plan),
    }
    Ok(())
}

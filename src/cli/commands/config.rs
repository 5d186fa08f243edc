//! Config Command
//!
//! Usage:
//!   draftsmith config show [--format json]
//!   draftsmith config path
//!   draftsmith config init [--global] [--force]

use crate::cli::ui::Output;
use crate::cli::util::{ConfigOverrides, OutputFormat, load_config};
use crate::config::ConfigLoader;
use crate::types::Result;

/// Print the effective configuration after all sources and overrides
pub fn show(overrides: &ConfigOverrides, format: OutputFormat) -> Result<()> {
    let config = load_config(overrides)?;
    let rendered = ConfigLoader::render(&config, format == OutputFormat::Json)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

pub fn path() -> Result<()> {
    let out = Output::new();
    match ConfigLoader::global_config_path() {
        Some(global) => out.field(
            "Global",
            format!(
                "{}{}",
                global.display(),
                if global.exists() { "" } else { " (missing)" }
            ),
        ),
        None => out.field("Global", "(no config directory)"),
    }

    let project = ConfigLoader::project_config_path();
    out.field(
        "Project",
        format!(
            "{}{}",
            project.display(),
            if project.exists() { "" } else { " (missing)" }
        ),
    );
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    Output::new().success(&format!("Configuration at {}", path.display()));
    Ok(())
}

//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (`$XDG_CONFIG_HOME/draftsmith/config.toml`)
//! 3. Project config (`.draftsmith/config.toml`)
//! 4. Environment variables (`DRAFTSMITH_*`, nested keys split on `__`)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DraftError, Result};

const ENV_PREFIX: &str = "DRAFTSMITH_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        Self::extract(figment.merge(Self::env_provider()))
    }

    /// Load configuration from a specific file (plus env overrides)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(DraftError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        Self::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path))
                .merge(Self::env_provider()),
        )
    }

    /// `DRAFTSMITH_REVIEW__MIN_SCORE=8` → `review.min_score`
    fn env_provider() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| DraftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Global config directory (`$XDG_CONFIG_HOME/draftsmith/`)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("draftsmith"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".draftsmith")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Render the effective configuration as TOML or JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DraftError::Config(e.to_string()))
        }
    }

    /// Write a commented default config into `dir`, returning the file path.
    ///
    /// Existing files are left alone unless `force` is set.
    pub fn init_at(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if config_path.exists() && !force {
            info!("Config exists: {}", config_path.display());
            return Ok(config_path);
        }

        fs::write(&config_path, Self::default_config_toml())?;
        info!("Created config: {}", config_path.display());
        Ok(config_path)
    }

    /// Initialize the project configuration in `.draftsmith/`
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::init_at(&Self::project_dir(), force)
    }

    /// Initialize the user-wide configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let dir = Self::global_dir().ok_or_else(|| {
            DraftError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&dir, force)
    }

    fn default_config_toml() -> &'static str {
        r#"# Draftsmith Configuration
# Project settings in .draftsmith/config.toml override the global file.
# Any key can be overridden with DRAFTSMITH_<SECTION>__<KEY>, e.g.
# DRAFTSMITH_REVIEW__MIN_SCORE=8

version = "1.0"

[llm]
provider = "openai"          # openai | ollama
# model = "gpt-4o-mini"
# api_base = "https://api.openai.com/v1"
timeout_secs = 120
max_output_tokens = 4096
input_price_per_mtok = 0.15
output_price_per_mtok = 0.60

[pipeline]
strategy = "thorough"        # fast | thorough
temperature = 0.7
section_concurrency = 1
deadline_secs = 1800

[pipeline.retry]
max_retries = 2
base_delay_ms = 500
max_delay_secs = 30
factor = 2.0

[review]
min_score = 7.0
max_iterations = 3
auto_revise = true
aggregation = "mean"         # mean | weighted
parallel_agents = false

[publish]
detect_slop = true
min_slop_quality = 70.0
word_tolerance = 0.4

# [content_types.newsletter]
# word_bounds = { min = 300, max = 600 }
#
# [[content_types.newsletter.sections]]
# title = "Headline"
# instruction = "One punchy paragraph stating the news"
# min_words = 50
# max_words = 100
"#
    }
}

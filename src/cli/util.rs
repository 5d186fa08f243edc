//! CLI Common Utilities
//!
//! Shared setup for command handlers: config resolution, request building,
//! the async runtime and output file handling.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ai::provider::ProviderKind;
use crate::config::{Config, ConfigLoader, Strategy};
use crate::types::{DraftError, GenerationRequest, Result, Tone, WordBounds};

// =============================================================================
// Output Format
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: markdown, json",
                s
            )),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file instead of the global/project chain
    pub config_path: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub min_score: Option<f32>,
    pub max_iterations: Option<usize>,
    pub concurrency: Option<usize>,
}

/// Request fields collected from command-line flags
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub topic: String,
    pub content_type: Option<String>,
    pub category: Option<String>,
    pub words: Option<u32>,
    pub keywords: Vec<String>,
    pub tone: Option<Tone>,
    pub min_words: Option<u32>,
    pub max_words: Option<u32>,
}

impl RequestOptions {
    pub fn into_request(self) -> Result<GenerationRequest> {
        let mut request = GenerationRequest::new(self.topic).with_keywords(self.keywords);

        if let Some(content_type) = self.content_type {
            request = request.with_content_type(content_type);
        }
        if let Some(category) = self.category {
            request = request.with_category(category);
        }
        if let Some(words) = self.words {
            request = request.with_target_words(words);
        }
        if let Some(tone) = self.tone {
            request = request.with_tone(tone);
        }

        match (self.min_words, self.max_words) {
            (Some(min), Some(max)) => request = request.with_word_bounds(WordBounds::new(min, max)),
            (None, None) => {}
            _ => {
                return Err(DraftError::Config(
                    "--min-words and --max-words must be given together".to_string(),
                ));
            }
        }

        request.validate()?;
        Ok(request)
    }
}

// =============================================================================
// Command Context
// =============================================================================

/// Resources every pipeline command needs
pub struct CommandContext {
    pub config: Config,
    /// Cancelled on Ctrl-C
    pub cancel: CancellationToken,
    pub runtime: Runtime,
}

impl CommandContext {
    /// Load config, apply overrides and start the runtime
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let config = load_config(overrides)?;
        let runtime = Runtime::new()?;
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                token.cancel();
            }
        });

        Ok(Self {
            config,
            cancel,
            runtime,
        })
    }
}

/// Resolve configuration and apply command-line overrides
pub fn load_config(overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = match &overrides.config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    if let Some(strategy) = overrides.strategy {
        config.pipeline.strategy = strategy;
    }
    if let Some(provider) = overrides.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = &overrides.model {
        config.llm.model = Some(model.clone());
    }
    if let Some(min_score) = overrides.min_score {
        config.review.min_score = min_score;
    }
    if let Some(max_iterations) = overrides.max_iterations {
        config.review.max_iterations = max_iterations;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.pipeline.section_concurrency = concurrency;
    }

    config.validate()?;
    debug!(strategy = %config.pipeline.strategy, provider = %config.llm.provider, "Config resolved");
    Ok(config)
}

// =============================================================================
// Files
// =============================================================================

/// Write `content` to `path`, creating parent directories
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DraftError::Config(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_request_options() {
        let request = RequestOptions {
            topic: "Tokio".into(),
            content_type: Some("tutorial".into()),
            words: Some(800),
            keywords: vec!["rust".into()],
            tone: Some(Tone::Beginner),
            ..Default::default()
        }
        .into_request()
        .unwrap();

        assert_eq!(request.content_type, "tutorial");
        assert_eq!(request.target_words, 800);
        assert_eq!(request.tone, Tone::Beginner);
        assert!(request.word_bounds.is_none());
    }

    #[test]
    fn test_half_bounds_rejected() {
        let result = RequestOptions {
            topic: "Tokio".into(),
            min_words: Some(100),
            ..Default::default()
        }
        .into_request();
        assert!(matches!(result, Err(DraftError::Config(_))));
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts/tokio.md");
        write_output(&path, "# Tokio\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), "# Tokio\n");
    }

    #[test]
    fn test_explicit_config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[review]\nmin_score = 8.0\n").unwrap();

        let config = load_config(&ConfigOverrides {
            config_path: Some(path),
            strategy: Some(Strategy::Fast),
            max_iterations: Some(2),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(config.review.min_score, 8.0);
        assert_eq!(config.review.max_iterations, 2);
        assert_eq!(config.pipeline.strategy, Strategy::Fast);
    }
}

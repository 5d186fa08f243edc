//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (`$XDG_CONFIG_HOME/draftsmith/`) and project
//! (`.draftsmith/`) level configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ai::provider::ProviderConfig;
use crate::ai::retry::RetryPolicy;
use crate::constants::{generation, network, publish, review};
use crate::types::{DraftError, Result, SectionSpec, WordBounds};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model provider settings
    pub llm: ProviderConfig,

    /// Strategy, concurrency, retry and deadline settings
    pub pipeline: PipelineSettings,

    /// Review loop settings
    pub review: ReviewSettings,

    /// Publish gating settings
    pub publish: PublishSettings,

    /// Per content-type overrides keyed by content-type name
    pub content_types: BTreeMap<String, ContentTypeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: ProviderConfig::default(),
            pipeline: PipelineSettings::default(),
            review: ReviewSettings::default(),
            publish: PublishSettings::default(),
            content_types: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DraftError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.llm.timeout_secs == 0 {
            return Err(DraftError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_output_tokens == 0 {
            return Err(DraftError::Config(
                "llm.max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if self.llm.input_price_per_mtok < 0.0 || self.llm.output_price_per_mtok < 0.0 {
            return Err(DraftError::Config(
                "llm prices must not be negative".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.pipeline.temperature) {
            return Err(DraftError::Config(format!(
                "pipeline.temperature must be between 0.0 and 2.0, got {}",
                self.pipeline.temperature
            )));
        }

        if self.pipeline.section_concurrency == 0 {
            return Err(DraftError::Config(
                "pipeline.section_concurrency must be at least 1".to_string(),
            ));
        }

        if self.pipeline.deadline_secs == 0 {
            return Err(DraftError::Config(
                "pipeline.deadline_secs must be greater than 0".to_string(),
            ));
        }

        self.review.validate()?;

        if !(0.0..=100.0).contains(&self.publish.min_slop_quality) {
            return Err(DraftError::Config(format!(
                "publish.min_slop_quality must be between 0 and 100, got {}",
                self.publish.min_slop_quality
            )));
        }

        if !(0.0..1.0).contains(&self.publish.word_tolerance) {
            return Err(DraftError::Config(format!(
                "publish.word_tolerance must be in [0, 1), got {}",
                self.publish.word_tolerance
            )));
        }

        for (name, content_type) in &self.content_types {
            content_type
                .validate()
                .map_err(|e| DraftError::Config(format!("content_types.{}: {}", name, e)))?;
        }

        Ok(())
    }
}

// =============================================================================
// Strategy
// =============================================================================

/// Cost profile chosen when a facade is constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single-pass draft, one editor, no revisions
    Fast,
    /// Chunked draft, full critique panel, revision loop
    #[default]
    Thorough,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Fast => write!(f, "fast"),
            Strategy::Thorough => write!(f, "thorough"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Strategy::Fast),
            "thorough" => Ok(Strategy::Thorough),
            _ => Err(format!(
                "Unknown strategy: {}. Valid values: fast, thorough",
                s
            )),
        }
    }
}

// =============================================================================
// Pipeline Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub strategy: Strategy,

    /// Sampling temperature for draft generation
    pub temperature: f32,

    /// Sections generated concurrently in chunked mode (1 = strictly sequential)
    pub section_concurrency: usize,

    /// Backoff for each provider call
    pub retry: RetryPolicy,

    /// Bound on one whole workflow, in seconds
    pub deadline_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            temperature: generation::TEMPERATURE,
            section_concurrency: generation::DEFAULT_SECTION_CONCURRENCY,
            retry: RetryPolicy::default(),
            deadline_secs: network::DEFAULT_DEADLINE_SECS,
        }
    }
}

// =============================================================================
// Review Settings
// =============================================================================

/// How per-agent scores combine into the round score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Mean weighted by each agent's weight
    Weighted,
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aggregation::Mean => write!(f, "mean"),
            Aggregation::Weighted => write!(f, "weighted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Aggregate score required for approval (1-10)
    pub min_score: f32,

    /// Review rounds, including the first (at least 1)
    pub max_iterations: usize,

    /// Revise and re-review below the threshold
    pub auto_revise: bool,

    pub aggregation: Aggregation,

    /// Per-role weight overrides for weighted aggregation
    pub weights: BTreeMap<String, f32>,

    /// Run the agents of one round concurrently
    pub parallel_agents: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            min_score: review::DEFAULT_MIN_SCORE,
            max_iterations: review::DEFAULT_MAX_ITERATIONS,
            auto_revise: true,
            aggregation: Aggregation::default(),
            weights: BTreeMap::new(),
            parallel_agents: false,
        }
    }
}

impl ReviewSettings {
    pub fn validate(&self) -> Result<()> {
        if !(review::SCORE_FLOOR..=review::SCORE_CEILING).contains(&self.min_score) {
            return Err(DraftError::Config(format!(
                "review.min_score must be between {} and {}, got {}",
                review::SCORE_FLOOR,
                review::SCORE_CEILING,
                self.min_score
            )));
        }

        if self.max_iterations == 0 || self.max_iterations > review::MAX_ITERATIONS_CEILING {
            return Err(DraftError::Config(format!(
                "review.max_iterations must be between 1 and {}, got {}",
                review::MAX_ITERATIONS_CEILING,
                self.max_iterations
            )));
        }

        if let Some((role, weight)) = self
            .weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(DraftError::Config(format!(
                "review.weights.{} must be a non-negative number, got {}",
                role, weight
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Publish Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Run the slop scan; when off, the slop gate is skipped
    pub detect_slop: bool,

    /// Slop-detection quality score required for publishing (0-100)
    pub min_slop_quality: f32,

    /// Accepted deviation from the target word count when no explicit bounds exist
    pub word_tolerance: f32,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            detect_slop: true,
            min_slop_quality: publish::DEFAULT_MIN_SLOP_QUALITY,
            word_tolerance: publish::DEFAULT_WORD_TOLERANCE,
        }
    }
}

// =============================================================================
// Content Types
// =============================================================================

/// Overrides for one content type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentTypeConfig {
    /// Replaces the built-in section plan for this content type
    pub sections: Option<Vec<SectionSpec>>,

    /// Publish word bounds for this content type
    pub word_bounds: Option<WordBounds>,
}

impl ContentTypeConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(sections) = &self.sections {
            if sections.is_empty() {
                return Err("sections must not be empty".to_string());
            }
            for section in sections {
                section.validate().map_err(|e| e.to_string())?;
            }
        }
        if let Some(bounds) = &self.word_bounds
            && (bounds.max == 0 || bounds.min > bounds.max)
        {
            return Err(format!("invalid word bounds {}", bounds));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.review.min_score, 7.0);
        assert_eq!(config.review.max_iterations, 3);
        assert!(config.review.auto_revise);
        assert_eq!(config.pipeline.strategy, Strategy::Thorough);
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        let mut config = Config::default();
        config.review.min_score = 11.0;
        assert!(matches!(config.validate(), Err(DraftError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let mut config = Config::default();
        config.review.max_iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_content_type_bounds() {
        let mut config = Config::default();
        config.content_types.insert(
            "newsletter".into(),
            ContentTypeConfig {
                sections: None,
                word_bounds: Some(WordBounds::new(500, 100)),
            },
        );
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("newsletter"));
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("FAST".parse::<Strategy>().unwrap(), Strategy::Fast);
        assert!("cheap".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_sections() {
        let config: Config = toml::from_str(
            r#"
            [review]
            min_score = 8.0
            aggregation = "weighted"

            [content_types.newsletter]
            word_bounds = { min = 300, max = 600 }

            [[content_types.newsletter.sections]]
            title = "Headline"
            instruction = "One punchy paragraph"
            min_words = 50
            max_words = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.review.aggregation, Aggregation::Weighted);
        let newsletter = &config.content_types["newsletter"];
        assert_eq!(newsletter.sections.as_ref().unwrap()[0].title, "Headline");
        assert!(config.validate().is_ok());
    }
}

//! Generation requests.
//!
//! A `GenerationRequest` is immutable input created per invocation and owned
//! by the caller. Stages only ever borrow it.

use serde::{Deserialize, Serialize};

use super::error::{ValidationError, ValidationErrorKind};
use super::section::SectionSpec;
use crate::constants::request as request_constants;

// =============================================================================
// Tone
// =============================================================================

/// Audience level the content is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Tone {
    /// Writing guidance passed to the model
    pub fn guidance(&self) -> &'static str {
        match self {
            Tone::Beginner => {
                "Write for newcomers: define every term, prefer short sentences and concrete examples."
            }
            Tone::Intermediate => {
                "Write for practitioners: assume fundamentals, focus on practical detail and trade-offs."
            }
            Tone::Advanced => {
                "Write for experts: be precise and dense, cover edge cases and internals."
            }
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tone::Beginner => write!(f, "beginner"),
            Tone::Intermediate => write!(f, "intermediate"),
            Tone::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Tone::Beginner),
            "intermediate" => Ok(Tone::Intermediate),
            "advanced" => Ok(Tone::Advanced),
            _ => Err(format!(
                "Unknown tone: {}. Valid values: beginner, intermediate, advanced",
                s
            )),
        }
    }
}

// =============================================================================
// Word Bounds
// =============================================================================

/// Inclusive word-count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBounds {
    pub min: u32,
    pub max: u32,
}

impl WordBounds {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Symmetric range around `target`, e.g. tolerance 0.4 gives ±40%
    pub fn around(target: u32, tolerance: f32) -> Self {
        let tolerance = tolerance.clamp(0.0, 1.0) as f64;
        let target = target as f64;
        Self {
            min: (target * (1.0 - tolerance)).round() as u32,
            max: (target * (1.0 + tolerance)).round() as u32,
        }
    }

    /// Widen both ends by `tolerance` (fraction of each bound)
    pub fn widened(&self, tolerance: f32) -> Self {
        let tolerance = tolerance.max(0.0) as f64;
        Self {
            min: (self.min as f64 * (1.0 - tolerance)).round().max(0.0) as u32,
            max: (self.max as f64 * (1.0 + tolerance)).round() as u32,
        }
    }

    pub fn contains(&self, words: usize) -> bool {
        words >= self.min as usize && words <= self.max as usize
    }
}

impl std::fmt::Display for WordBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} words", self.min, self.max)
    }
}

// =============================================================================
// Generation Request
// =============================================================================

/// Input for one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default = "default_category")]
    pub category: String,
    /// Content-type key used to pick a section plan (tutorial, guide, article, case-study)
    #[serde(default = "default_content_type")]
    pub content_type: String,
    #[serde(default = "default_target_words")]
    pub target_words: u32,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tone: Tone,
    /// Explicit section plan; overrides the content-type default
    #[serde(default)]
    pub sections: Option<Vec<SectionSpec>>,
    /// Explicit publish bounds; overrides configured and derived bounds
    #[serde(default)]
    pub word_bounds: Option<WordBounds>,
}

fn default_category() -> String {
    request_constants::DEFAULT_CATEGORY.to_string()
}

fn default_content_type() -> String {
    request_constants::DEFAULT_CONTENT_TYPE.to_string()
}

fn default_target_words() -> u32 {
    request_constants::DEFAULT_TARGET_WORDS
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            category: default_category(),
            content_type: default_content_type(),
            target_words: default_target_words(),
            keywords: Vec::new(),
            tone: Tone::default(),
            sections: None,
            word_bounds: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_target_words(mut self, words: u32) -> Self {
        self.target_words = words;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionSpec>) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_word_bounds(mut self, bounds: WordBounds) -> Self {
        self.word_bounds = Some(bounds);
        self
    }

    /// Reject malformed requests before any provider call is made
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(
                ValidationError::new(ValidationErrorKind::MissingField, "topic must not be empty")
                    .with_field("topic"),
            );
        }

        if self.target_words == 0 {
            return Err(ValidationError::new(
                ValidationErrorKind::Range,
                "target word count must be positive",
            )
            .with_field("target_words")
            .with_comparison("> 0", self.target_words.to_string()));
        }

        if self.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ValidationError::new(
                ValidationErrorKind::Format,
                "keywords must not contain empty entries",
            )
            .with_field("keywords"));
        }

        if let Some(sections) = &self.sections {
            if sections.is_empty() {
                return Err(ValidationError::new(
                    ValidationErrorKind::MissingField,
                    "explicit section list must not be empty",
                )
                .with_field("sections"));
            }
            for section in sections {
                section.validate()?;
            }
        }

        if let Some(bounds) = &self.word_bounds
            && (bounds.max == 0 || bounds.min > bounds.max)
        {
            return Err(ValidationError::new(
                ValidationErrorKind::Range,
                format!("invalid word bounds {}", bounds),
            )
            .with_field("word_bounds"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = GenerationRequest::new("Async Rust");
        assert_eq!(request.target_words, 800);
        assert_eq!(request.content_type, "article");
        assert_eq!(request.tone, Tone::Intermediate);
        assert!(request.keywords.is_empty());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_target_words_rejected() {
        let err = GenerationRequest::new("Async Rust")
            .with_target_words(0)
            .validate()
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::Range);
        assert_eq!(err.field.as_deref(), Some("target_words"));
    }

    #[test]
    fn test_empty_topic_rejected() {
        let err = GenerationRequest::new("  ").validate().unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
    }

    #[test]
    fn test_empty_section_override_rejected() {
        let err = GenerationRequest::new("Async Rust")
            .with_sections(vec![])
            .validate()
            .unwrap_err();
        assert_eq!(err.field.as_deref(), Some("sections"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"topic": "Tokio", "tone": "beginner"}"#).unwrap();
        assert_eq!(request.tone, Tone::Beginner);
        assert_eq!(request.target_words, 800);
        assert_eq!(request.category, "general");
    }

    #[test]
    fn test_word_bounds_around() {
        let bounds = WordBounds::around(1000, 0.4);
        assert_eq!(bounds, WordBounds::new(600, 1400));
        assert!(bounds.contains(600));
        assert!(bounds.contains(1400));
        assert!(!bounds.contains(1401));
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!("ADVANCED".parse::<Tone>().unwrap(), Tone::Advanced);
        assert!("expert".parse::<Tone>().is_err());
    }
}

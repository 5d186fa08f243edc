//! Generated drafts and their metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cost;
use super::request::WordBounds;
use super::utils::word_count;
use crate::constants::generation::SECTION_SEPARATOR;

/// How a draft was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// One provider call for the whole document
    SinglePass,
    /// One provider call per planned section
    Chunked,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::SinglePass => write!(f, "single-pass"),
            GenerationMode::Chunked => write!(f, "chunked"),
        }
    }
}

/// Output of one section call in chunked mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutput {
    pub index: usize,
    pub title: String,
    /// Section body without its heading
    pub body: String,
    pub word_count: usize,
}

impl SectionOutput {
    pub fn new(index: usize, title: impl Into<String>, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            index,
            title: title.into(),
            word_count: word_count(&body),
            body,
        }
    }

    /// Section as it appears in the assembled draft
    pub fn render(&self) -> String {
        format!("## {}\n\n{}", self.title, self.body)
    }
}

/// Join rendered sections in the given order.
///
/// This is the only assembly routine for chunked drafts, so re-joining
/// `GeneratedDraft::sections` always reproduces `GeneratedDraft::content`.
pub fn assemble_sections(sections: &[SectionOutput]) -> String {
    sections
        .iter()
        .map(SectionOutput::render)
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Metadata recorded alongside a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftMetadata {
    /// Measured on the final content string
    pub word_count: usize,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: Cost,
    pub model: String,
    pub provider: String,
    pub mode: GenerationMode,
    /// Provider calls made to produce this draft
    pub calls: u32,
    pub generated_at: DateTime<Utc>,
    /// Filled in once a review has scored the draft
    pub quality_score: Option<f32>,
    /// Aggregate section bounds widened by the section tolerance (chunked only)
    #[serde(default)]
    pub plan_bounds: Option<WordBounds>,
}

impl DraftMetadata {
    pub fn tokens_used(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Whether the assembled length landed inside `plan_bounds`
    pub fn within_plan_bounds(&self) -> Option<bool> {
        self.plan_bounds.map(|bounds| bounds.contains(self.word_count))
    }
}

/// Unreviewed output of the generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDraft {
    pub content: String,
    pub metadata: DraftMetadata,
    /// Per-section outputs in plan order (empty for single-pass drafts)
    #[serde(default)]
    pub sections: Vec<SectionOutput>,
}

//! Publish artifacts.

use serde::{Deserialize, Serialize};

use super::draft::GeneratedDraft;
use super::request::WordBounds;
use super::review::AgentReview;

/// Search metadata derived from the final content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub slug: String,
}

/// Heuristic scan for generic machine-written phrasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlopReport {
    /// Filler phrases found
    pub tell_count: usize,
    /// Distinct phrases that matched, lowercased
    pub matched_phrases: Vec<String>,
    /// Hedging words per word of prose
    pub hedging_ratio: f32,
    /// Standard deviation of sentence length in words
    pub sentence_length_stddev: f32,
    /// 0 (all slop) to 100 (clean)
    pub quality_score: f32,
}

/// Reason a result is not publish-ready
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PublishBlocker {
    /// `score` is None when no review ran
    NotApproved { score: Option<f32>, min_score: f32 },
    SlopQuality { score: f32, minimum: f32 },
    WordCount { actual: usize, bounds: WordBounds },
}

impl std::fmt::Display for PublishBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishBlocker::NotApproved {
                score: Some(score),
                min_score,
            } => write!(f, "not approved (score {:.1} < {:.1})", score, min_score),
            PublishBlocker::NotApproved { score: None, .. } => write!(f, "not reviewed"),
            PublishBlocker::SlopQuality { score, minimum } => {
                write!(f, "slop quality {:.0} below minimum {:.0}", score, minimum)
            }
            PublishBlocker::WordCount { actual, bounds } => {
                write!(f, "{} words outside {}", actual, bounds)
            }
        }
    }
}

/// Terminal artifact of a full pipeline run, returned by value to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub topic: String,
    pub original_draft: GeneratedDraft,
    pub final_content: String,
    pub reviews: Vec<AgentReview>,
    /// None when the publisher ran without a reviewer
    pub final_score: Option<f32>,
    pub iterations: u32,
    pub seo: SeoMetadata,
    /// Flesch reading ease, 0..=100
    pub readability_score: f32,
    pub word_count: usize,
    pub word_bounds: WordBounds,
    pub approved: bool,
    pub publish_ready: bool,
    pub slop: Option<SlopReport>,
    /// Empty exactly when `publish_ready` is true
    #[serde(default)]
    pub blockers: Vec<PublishBlocker>,
}

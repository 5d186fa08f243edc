//! Review artifacts.
//!
//! `AgentReview` entries are immutable once created and accumulate in
//! execution order. `ReviewResult` only ever contains reviews from rounds that
//! completed in full.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::review::{SCORE_CEILING, SCORE_FLOOR};

/// Clamp a score into the accepted 1..=10 range; NaN collapses to the floor
pub fn clamp_score(score: f32) -> f32 {
    if score.is_nan() {
        return SCORE_FLOOR;
    }
    score.clamp(SCORE_FLOOR, SCORE_CEILING)
}

/// One critique pass by one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReview {
    /// Stable role key, e.g. "technical-accuracy"
    pub role: String,
    /// Human-readable agent name
    pub agent: String,
    /// Review round this entry belongs to (1-based)
    pub iteration: u32,
    pub passed: bool,
    pub score: f32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
    pub reviewed_at: DateTime<Utc>,
}

/// Why the review loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityGateVerdict {
    /// Aggregate score reached the threshold
    Passed,
    /// Iteration cap reached below the threshold
    Exhausted,
    /// Below threshold with auto-revision disabled
    ReviseDisabled,
}

impl std::fmt::Display for QualityGateVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualityGateVerdict::Passed => write!(f, "passed"),
            QualityGateVerdict::Exhausted => write!(f, "iteration cap reached"),
            QualityGateVerdict::ReviseDisabled => write!(f, "auto-revision disabled"),
        }
    }
}

/// Output of one reviewer invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub original_content: String,
    /// Latest revision, or the original when no revision ran
    pub final_content: String,
    /// All reviews from completed rounds, in agent execution order
    pub reviews: Vec<AgentReview>,
    pub final_score: f32,
    pub approved: bool,
    pub iterations: u32,
    /// Aggregate score of each completed round
    pub score_history: Vec<f32>,
    pub verdict: QualityGateVerdict,
}

impl ReviewResult {
    pub fn was_revised(&self) -> bool {
        self.original_content != self.final_content
    }

    /// Reviews from the last completed round
    pub fn latest_reviews(&self) -> impl Iterator<Item = &AgentReview> {
        let last = self.iterations;
        self.reviews.iter().filter(move |r| r.iteration == last)
    }

    /// Weaknesses and improvements from the last round, for resubmission
    pub fn outstanding_feedback(&self) -> Vec<String> {
        self.latest_reviews()
            .flat_map(|r| r.weaknesses.iter().chain(r.improvements.iter()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(iteration: u32, weakness: &str) -> AgentReview {
        AgentReview {
            role: "editor".into(),
            agent: "Editor".into(),
            iteration,
            passed: false,
            score: 5.0,
            strengths: vec![],
            weaknesses: vec![weakness.into()],
            improvements: vec![],
            reasoning: String::new(),
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(0.0), 1.0);
        assert_eq!(clamp_score(12.5), 10.0);
        assert_eq!(clamp_score(7.5), 7.5);
        assert_eq!(clamp_score(f32::NAN), 1.0);
    }

    #[test]
    fn test_outstanding_feedback_uses_last_round() {
        let result = ReviewResult {
            original_content: "a".into(),
            final_content: "b".into(),
            reviews: vec![review(1, "old"), review(2, "new")],
            final_score: 5.0,
            approved: false,
            iterations: 2,
            score_history: vec![4.0, 5.0],
            verdict: QualityGateVerdict::Exhausted,
        };
        assert!(result.was_revised());
        assert_eq!(result.outstanding_feedback(), vec!["new".to_string()]);
    }
}

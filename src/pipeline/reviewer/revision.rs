//! Revision step of the review loop.
//!
//! One provider call per revision: current content plus the round's
//! weaknesses and improvements in, revised document out.

use tracing::debug;

use super::prompts::{revision_prompt, revision_system_prompt};
use crate::ai::provider::{CompletionRequest, SharedProvider};
use crate::ai::usage::Stage;
use crate::constants::review::REVISION_TEMPERATURE;
use crate::pipeline::context::RunContext;
use crate::pipeline::generator::prompts::max_tokens_for;
use crate::types::{AgentReview, DraftError, GenerationRequest, Result, word_count};

/// Structured feedback collected from one completed round
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionFeedback {
    /// Aggregate score of the round
    pub score: f32,
    /// Score needed for approval
    pub target: f32,
    pub weaknesses: Vec<String>,
    pub improvements: Vec<String>,
}

impl RevisionFeedback {
    /// Collect feedback in agent order, prefixed with the agent name, without duplicates
    pub fn from_round(round: &[AgentReview], score: f32, target: f32) -> Self {
        let mut weaknesses = Vec::new();
        let mut improvements = Vec::new();

        for review in round {
            for item in &review.weaknesses {
                let line = format!("{}: {}", review.agent, item);
                if !weaknesses.contains(&line) {
                    weaknesses.push(line);
                }
            }
            for item in &review.improvements {
                let line = format!("{}: {}", review.agent, item);
                if !improvements.contains(&line) {
                    improvements.push(line);
                }
            }
        }

        Self {
            score,
            target,
            weaknesses,
            improvements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weaknesses.is_empty() && self.improvements.is_empty()
    }
}

pub struct Reviser {
    provider: SharedProvider,
    max_output_tokens: u32,
}

impl Reviser {
    pub fn new(provider: SharedProvider, max_output_tokens: u32) -> Self {
        Self {
            provider,
            max_output_tokens,
        }
    }

    pub async fn revise(
        &self,
        content: &str,
        request: &GenerationRequest,
        feedback: &RevisionFeedback,
        ctx: &RunContext,
    ) -> Result<String> {
        if feedback.is_empty() {
            debug!("Revising without itemized feedback, score only");
        }

        // Room for the longer of the current text and the requested length
        let words = (word_count(content) as u32).max(request.target_words);
        let completion_request = CompletionRequest::new(
            "revision",
            revision_system_prompt(request),
            revision_prompt(content, request, feedback),
        )
        .with_max_output_tokens(max_tokens_for(words, self.max_output_tokens))
        .with_temperature(REVISION_TEMPERATURE);

        let completion = ctx
            .complete(self.provider.as_ref(), &completion_request, Stage::Revision)
            .await?;

        let revised = unwrap_document_fence(&completion.text);
        if revised.is_empty() {
            return Err(DraftError::pipeline_recoverable(
                "revision",
                "provider returned an empty revision",
            ));
        }
        Ok(revised)
    }
}

/// Remove a code fence wrapped around the whole document
fn unwrap_document_fence(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```")
        && let Some(body) = rest.strip_suffix("```")
        && let Some(newline) = body.find('\n')
    {
        return body[newline + 1..].trim().to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generator::test_support::ScriptedProvider;
    use chrono::Utc;
    use std::sync::Arc;

    fn review(agent: &str, weaknesses: &[&str], improvements: &[&str]) -> AgentReview {
        AgentReview {
            role: agent.to_lowercase(),
            agent: agent.to_string(),
            iteration: 1,
            passed: false,
            score: 5.0,
            strengths: vec![],
            weaknesses: weaknesses.iter().map(|s| s.to_string()).collect(),
            improvements: improvements.iter().map(|s| s.to_string()).collect(),
            reasoning: String::new(),
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_feedback_from_round() {
        let round = vec![
            review("Editor", &["too long", "too long"], &["cut intro"]),
            review("SEO", &[], &["add keyword to title"]),
        ];
        let feedback = RevisionFeedback::from_round(&round, 5.0, 7.0);
        assert_eq!(feedback.weaknesses, vec!["Editor: too long"]);
        assert_eq!(
            feedback.improvements,
            vec!["Editor: cut intro", "SEO: add keyword to title"]
        );
        assert!(!feedback.is_empty());
    }

    #[test]
    fn test_unwrap_document_fence() {
        assert_eq!(unwrap_document_fence("```markdown\n# Title\nBody\n```"), "# Title\nBody");
        assert_eq!(unwrap_document_fence("# Title\n\n```rust\nfn main() {}\n```\n"), "# Title\n\n```rust\nfn main() {}\n```");
    }

    #[tokio::test]
    async fn test_revise_records_revision_stage() {
        let provider = Arc::new(ScriptedProvider::new().reply("revision", "# Better\n\nImproved body."));
        let reviser = Reviser::new(provider, 4096);
        let ctx = RunContext::detached();
        let feedback = RevisionFeedback::from_round(&[review("Editor", &["vague"], &[])], 5.0, 7.0);

        let revised = reviser
            .revise("# Draft\n\nBody.", &GenerationRequest::new("Tokio"), &feedback, &ctx)
            .await
            .unwrap();
        assert_eq!(revised, "# Better\n\nImproved body.");
        assert_eq!(ctx.ledger().stage(Stage::Revision).calls, 1);
    }
}

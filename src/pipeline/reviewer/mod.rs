//! Review Loop
//!
//! `PanelReviewer` runs a panel of critique agents over the current content,
//! aggregates their scores and, while the score stays below threshold, revises
//! and reviews again. The loop is bounded by `max_iterations`.
//!
//! ## Stop conditions (checked after every round)
//!
//! - aggregate score ≥ `min_score` → `Passed`
//! - `auto_revise` disabled → `ReviseDisabled`
//! - iteration cap reached → `Exhausted`
//!
//! Falling short of the threshold is not an error: the result carries
//! `approved = false` and every review for the caller to inspect.
//!
//! A failed agent call aborts the round and the whole review. Reviews are
//! appended only once their round completed, in panel order, even when the
//! agents of a round run concurrently.

pub mod agents;
mod prompts;
pub mod revision;

pub use agents::{AgentDescriptor, aggregate_scores, fast_panel, thorough_panel};
pub use revision::{RevisionFeedback, Reviser};

use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use self::agents::{AgentRun, run_agent};
use super::context::RunContext;
use super::events::PipelineEvent;
use crate::ai::provider::SharedProvider;
use crate::ai::usage::Stage;
use crate::config::ReviewSettings;
use crate::types::{
    AgentReview, GenerationRequest, QualityGateVerdict, Result, ReviewResult, word_count,
};

/// Critiques content and optionally drives revisions
#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(
        &self,
        content: &str,
        request: &GenerationRequest,
        ctx: &RunContext,
    ) -> Result<ReviewResult>;

    /// Settings this reviewer applies
    fn settings(&self) -> &ReviewSettings;
}

pub type SharedReviewer = Arc<dyn Reviewer>;

pub struct PanelReviewer {
    provider: SharedProvider,
    panel: Vec<AgentDescriptor>,
    settings: ReviewSettings,
    reviser: Reviser,
}

impl PanelReviewer {
    pub fn new(
        provider: SharedProvider,
        panel: Vec<AgentDescriptor>,
        settings: ReviewSettings,
        max_output_tokens: u32,
    ) -> Self {
        let reviser = Reviser::new(Arc::clone(&provider), max_output_tokens);
        Self {
            provider,
            panel,
            settings,
            reviser,
        }
    }

    pub fn panel(&self) -> &[AgentDescriptor] {
        &self.panel
    }

    /// One full round; either every agent's review or the first error
    async fn run_round(&self, run: &AgentRun<'_>, ctx: &RunContext) -> Result<Vec<AgentReview>> {
        let provider = self.provider.as_ref();

        if self.settings.parallel_agents {
            try_join_all(
                self.panel
                    .iter()
                    .map(|descriptor| run_agent(provider, descriptor, run, ctx)),
            )
            .await
        } else {
            let mut round = Vec::with_capacity(self.panel.len());
            for descriptor in &self.panel {
                round.push(run_agent(provider, descriptor, run, ctx).await?);
            }
            Ok(round)
        }
    }

    fn verdict(&self, score: f32, iteration: u32) -> Option<QualityGateVerdict> {
        if score >= self.settings.min_score {
            Some(QualityGateVerdict::Passed)
        } else if !self.settings.auto_revise {
            Some(QualityGateVerdict::ReviseDisabled)
        } else if iteration as usize >= self.settings.max_iterations.max(1) {
            Some(QualityGateVerdict::Exhausted)
        } else {
            None
        }
    }
}

#[async_trait]
impl Reviewer for PanelReviewer {
    async fn review(
        &self,
        content: &str,
        request: &GenerationRequest,
        ctx: &RunContext,
    ) -> Result<ReviewResult> {
        let start = Instant::now();
        ctx.emit(PipelineEvent::StageStarted {
            invocation: ctx.invocation_id(),
            stage: Stage::Review,
        });

        let min_score = self.settings.min_score;
        let mut current = content.to_string();
        let mut reviews = Vec::new();
        let mut score_history = Vec::new();
        let mut iteration: u32 = 0;

        let (final_score, verdict) = loop {
            iteration += 1;

            let run = AgentRun {
                content: &current,
                request,
                iteration,
                min_score,
            };
            let round = self.run_round(&run, ctx).await?;
            let score = aggregate_scores(
                &round,
                &self.panel,
                self.settings.aggregation,
                &self.settings.weights,
            );
            score_history.push(score);

            info!(
                iteration,
                score = %format!("{:.2}", score),
                min_score,
                agents = round.len(),
                "Review round complete"
            );

            if let Some(verdict) = self.verdict(score, iteration) {
                reviews.extend(round);
                break (score, verdict);
            }

            let feedback = RevisionFeedback::from_round(&round, score, min_score);
            reviews.extend(round);

            current = self.reviser.revise(&current, request, &feedback, ctx).await?;
            ctx.emit(PipelineEvent::RevisionApplied {
                invocation: ctx.invocation_id(),
                iteration,
                score,
                words: word_count(&current),
            });
        };

        let approved = final_score >= min_score;
        if !approved {
            warn!(
                score = %format!("{:.2}", final_score),
                min_score,
                verdict = %verdict,
                "Content not approved"
            );
        }

        ctx.emit(PipelineEvent::StageCompleted {
            invocation: ctx.invocation_id(),
            stage: Stage::Review,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        Ok(ReviewResult {
            original_content: content.to_string(),
            final_content: current,
            reviews,
            final_score,
            approved,
            iterations: iteration,
            score_history,
            verdict,
        })
    }

    fn settings(&self) -> &ReviewSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generator::test_support::ScriptedProvider;
    use crate::types::DraftError;

    fn verdict_json(score: f32) -> String {
        format!(
            r#"{{"passed": {}, "score": {}, "strengths": ["clear"], "weaknesses": ["thin examples"], "improvements": ["add a code sample"], "reasoning": "ok"}}"#,
            score >= 7.0,
            score
        )
    }

    fn settings(max_iterations: usize, auto_revise: bool) -> ReviewSettings {
        ReviewSettings {
            max_iterations,
            auto_revise,
            ..ReviewSettings::default()
        }
    }

    fn editor_reviewer(provider: ScriptedProvider, settings: ReviewSettings) -> PanelReviewer {
        PanelReviewer::new(Arc::new(provider), fast_panel(), settings, 4096)
    }

    #[tokio::test]
    async fn test_passes_first_round() {
        let provider = ScriptedProvider::new().reply("agent:editor", &verdict_json(8.0));
        let reviewer = editor_reviewer(provider, settings(3, true));

        let result = reviewer
            .review("Draft", &GenerationRequest::new("Tokio"), &RunContext::detached())
            .await
            .unwrap();
        assert!(result.approved);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.verdict, QualityGateVerdict::Passed);
        assert_eq!(result.final_content, "Draft");
        assert!(!result.was_revised());
    }

    #[tokio::test]
    async fn test_revise_disabled_stops_after_one_round() {
        let provider = ScriptedProvider::new().reply("agent:editor", &verdict_json(3.0));
        let reviewer = editor_reviewer(provider, settings(5, false));

        let result = reviewer
            .review("Draft", &GenerationRequest::new("Tokio"), &RunContext::detached())
            .await
            .unwrap();
        assert!(!result.approved);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.verdict, QualityGateVerdict::ReviseDisabled);
    }

    #[tokio::test]
    async fn test_exhausts_iteration_cap() {
        let provider = ScriptedProvider::new()
            .reply("agent:editor", &verdict_json(5.0))
            .reply("revision", "Revised draft");
        let reviewer = editor_reviewer(provider, settings(2, true));
        let ctx = RunContext::detached();

        let result = reviewer
            .review("Draft", &GenerationRequest::new("Tokio"), &ctx)
            .await
            .unwrap();
        assert!(!result.approved);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.reviews.len(), 2);
        assert_eq!(result.score_history, vec![5.0, 5.0]);
        assert_eq!(result.final_content, "Revised draft");
        assert_eq!(result.verdict, QualityGateVerdict::Exhausted);
        // Revision only between rounds, never after the last one
        assert_eq!(ctx.ledger().stage(Stage::Revision).calls, 1);
    }

    #[tokio::test]
    async fn test_parallel_round_keeps_panel_order() {
        let mut provider = ScriptedProvider::new().delay("agent:technical-accuracy", 30);
        for descriptor in thorough_panel() {
            provider = provider.reply(&format!("agent:{}", descriptor.role), &verdict_json(8.0));
        }
        let reviewer = PanelReviewer::new(
            Arc::new(provider),
            thorough_panel(),
            ReviewSettings {
                parallel_agents: true,
                ..ReviewSettings::default()
            },
            4096,
        );

        let result = reviewer
            .review("Draft", &GenerationRequest::new("Tokio"), &RunContext::detached())
            .await
            .unwrap();
        let roles: Vec<&str> = result.reviews.iter().map(|r| r.role.as_str()).collect();
        assert_eq!(
            roles,
            vec!["technical-accuracy", "readability", "seo", "engagement", "fact-check"]
        );
    }

    #[tokio::test]
    async fn test_agent_failure_fails_review() {
        let mut provider = ScriptedProvider::new();
        for descriptor in thorough_panel() {
            provider = provider.reply(&format!("agent:{}", descriptor.role), &verdict_json(8.0));
        }
        let provider = provider.fail_on("agent:seo");
        let reviewer = PanelReviewer::new(
            Arc::new(provider),
            thorough_panel(),
            ReviewSettings::default(),
            4096,
        );

        let err = reviewer
            .review("Draft", &GenerationRequest::new("Tokio"), &RunContext::detached())
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::Provider(_)));
    }
}

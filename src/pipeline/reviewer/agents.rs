//! Critique Agents
//!
//! Every agent is an `AgentDescriptor`: plain data naming its role, its focus
//! and its aggregation weight. A single `run_agent` routine executes any
//! descriptor, so adding an agent means adding a descriptor.
//!
//! ## Agent Runner
//!
//! 1. Build prompt → 2. Call provider → 3. Parse verdict → 4. Clamp score → 5. Emit event

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::prompts::{agent_prompt, agent_system_prompt};
use crate::ai::provider::{CompletionRequest, ModelProvider};
use crate::ai::usage::Stage;
use crate::ai::validation::parse_structured;
use crate::config::Aggregation;
use crate::constants::review::{AGENT_MAX_TOKENS, AGENT_TEMPERATURE, SCORE_FLOOR};
use crate::pipeline::context::RunContext;
use crate::pipeline::events::PipelineEvent;
use crate::types::{AgentReview, GenerationRequest, Result, clamp_score};

// =============================================================================
// Agent Descriptors
// =============================================================================

/// Data describing one critique agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Stable key used in logs, weights and request labels
    pub role: String,
    /// Human-readable name
    pub name: String,
    /// What this agent checks, inserted into its system instruction
    pub focus: String,
    /// Weight under `Aggregation::Weighted`
    pub weight: f32,
}

impl AgentDescriptor {
    pub fn new(
        role: impl Into<String>,
        name: impl Into<String>,
        focus: impl Into<String>,
        weight: f32,
    ) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
            focus: focus.into(),
            weight,
        }
    }
}

/// Five specialists used by the thorough strategy, in execution order
pub fn thorough_panel() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new(
            "technical-accuracy",
            "Technical Accuracy Reviewer",
            "Correctness of technical claims, code, commands and terminology. \
             Flag anything wrong, outdated or misleading.",
            1.5,
        ),
        AgentDescriptor::new(
            "readability",
            "Readability Reviewer",
            "Clarity, structure and flow. Sentence length, paragraph size, \
             transitions and whether the level matches the intended audience.",
            1.0,
        ),
        AgentDescriptor::new(
            "seo",
            "SEO Reviewer",
            "Title and heading quality, natural keyword coverage, a clear \
             opening summary and scannable structure.",
            0.75,
        ),
        AgentDescriptor::new(
            "engagement",
            "Engagement Reviewer",
            "Whether the opening earns attention, examples are concrete and \
             the piece gives the reader a reason to keep going.",
            0.75,
        ),
        AgentDescriptor::new(
            "fact-check",
            "Fact Checker",
            "Unsupported claims, invented statistics, vague attributions and \
             statements that need a source or a qualifier.",
            1.0,
        ),
    ]
}

/// Single general editor used by the fast strategy
pub fn fast_panel() -> Vec<AgentDescriptor> {
    vec![AgentDescriptor::new(
        "editor",
        "General Editor",
        "Overall quality: accuracy, clarity, structure and usefulness to the \
         intended audience.",
        1.0,
    )]
}

// =============================================================================
// Agent Runner
// =============================================================================

/// Raw verdict as the model returns it
#[derive(Debug, Deserialize)]
struct AgentVerdict {
    #[serde(default)]
    passed: Option<bool>,
    score: f32,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// Inputs shared by every agent in one review round
pub struct AgentRun<'a> {
    pub content: &'a str,
    pub request: &'a GenerationRequest,
    pub iteration: u32,
    pub min_score: f32,
}

/// Run one descriptor against the current content.
///
/// Unparseable output is an error; it aborts the round like a provider failure.
pub async fn run_agent(
    provider: &dyn ModelProvider,
    descriptor: &AgentDescriptor,
    run: &AgentRun<'_>,
    ctx: &RunContext,
) -> Result<AgentReview> {
    debug!(
        agent = %descriptor.role,
        iteration = run.iteration,
        "Running critique agent"
    );

    let request = CompletionRequest::new(
        format!("agent:{}", descriptor.role),
        agent_system_prompt(descriptor),
        agent_prompt(descriptor, run.content, run.request, run.min_score),
    )
    .with_max_output_tokens(AGENT_MAX_TOKENS)
    .with_temperature(AGENT_TEMPERATURE);

    let completion = ctx.complete(provider, &request, Stage::Review).await?;
    let parsed = parse_structured::<AgentVerdict>(&completion.text, "review")?;
    if parsed.was_repaired {
        debug!(agent = %descriptor.role, "Agent verdict needed JSON repair");
    }

    let verdict = parsed.value;
    let score = clamp_score(verdict.score);
    let review = AgentReview {
        role: descriptor.role.clone(),
        agent: descriptor.name.clone(),
        iteration: run.iteration,
        passed: verdict.passed.unwrap_or(score >= run.min_score),
        score,
        strengths: clean_items(verdict.strengths),
        weaknesses: clean_items(verdict.weaknesses),
        improvements: clean_items(verdict.improvements),
        reasoning: verdict.reasoning.trim().to_string(),
        reviewed_at: Utc::now(),
    };

    debug!(
        agent = %descriptor.role,
        score = review.score,
        passed = review.passed,
        weaknesses = review.weaknesses.len(),
        "Agent verdict"
    );
    ctx.emit(PipelineEvent::AgentReviewed {
        invocation: ctx.invocation_id(),
        iteration: run.iteration,
        agent: descriptor.role.clone(),
        score: review.score,
        passed: review.passed,
    });

    Ok(review)
}

fn clean_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

// =============================================================================
// Aggregation
// =============================================================================

/// Combine one round's scores.
///
/// Weighted mode takes each agent's weight from `overrides` when present,
/// otherwise from its descriptor, and falls back to the plain mean when the
/// weights sum to zero.
pub fn aggregate_scores(
    round: &[AgentReview],
    panel: &[AgentDescriptor],
    aggregation: Aggregation,
    overrides: &BTreeMap<String, f32>,
) -> f32 {
    if round.is_empty() {
        return SCORE_FLOOR;
    }

    let mean = round.iter().map(|r| r.score).sum::<f32>() / round.len() as f32;

    match aggregation {
        Aggregation::Mean => mean,
        Aggregation::Weighted => {
            let weight_of = |role: &str| {
                overrides.get(role).copied().unwrap_or_else(|| {
                    panel
                        .iter()
                        .find(|d| d.role == role)
                        .map(|d| d.weight)
                        .unwrap_or(1.0)
                })
            };

            let (weighted, total) = round.iter().fold((0.0f32, 0.0f32), |(sum, total), r| {
                let w = weight_of(&r.role).max(0.0);
                (sum + r.score * w, total + w)
            });

            if total > 0.0 { weighted / total } else { mean }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generator::test_support::ScriptedProvider;
    use crate::types::DraftError;

    fn review(role: &str, score: f32) -> AgentReview {
        AgentReview {
            role: role.to_string(),
            agent: role.to_string(),
            iteration: 1,
            passed: score >= 7.0,
            score,
            strengths: vec![],
            weaknesses: vec![],
            improvements: vec![],
            reasoning: String::new(),
            reviewed_at: Utc::now(),
        }
    }

    #[test]
    fn test_panels() {
        let roles: Vec<String> = thorough_panel().into_iter().map(|d| d.role).collect();
        assert_eq!(
            roles,
            vec!["technical-accuracy", "readability", "seo", "engagement", "fact-check"]
        );
        assert_eq!(fast_panel().len(), 1);
    }

    #[test]
    fn test_mean_aggregation_ignores_majority() {
        // One harsh reviewer does not veto a strong aggregate
        let round = vec![review("a", 9.0), review("b", 9.0), review("c", 4.0)];
        let score = aggregate_scores(&round, &[], Aggregation::Mean, &BTreeMap::new());
        assert!((score - 22.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_weighted_aggregation() {
        let panel = vec![
            AgentDescriptor::new("a", "A", "", 3.0),
            AgentDescriptor::new("b", "B", "", 1.0),
        ];
        let round = vec![review("a", 8.0), review("b", 4.0)];
        let score = aggregate_scores(&round, &panel, Aggregation::Weighted, &BTreeMap::new());
        assert!((score - 7.0).abs() < 1e-5);

        let mut overrides = BTreeMap::new();
        overrides.insert("a".to_string(), 1.0);
        let score = aggregate_scores(&round, &panel, Aggregation::Weighted, &overrides);
        assert!((score - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_weights_fall_back_to_mean() {
        let panel = vec![AgentDescriptor::new("a", "A", "", 0.0)];
        let round = vec![review("a", 6.0)];
        let score = aggregate_scores(&round, &panel, Aggregation::Weighted, &BTreeMap::new());
        assert_eq!(score, 6.0);
        assert_eq!(
            aggregate_scores(&[], &panel, Aggregation::Mean, &BTreeMap::new()),
            SCORE_FLOOR
        );
    }

    #[tokio::test]
    async fn test_run_agent_parses_fenced_json() {
        let provider = ScriptedProvider::new().reply(
            "agent:seo",
            "Here you go:\n```json\n{\"passed\": false, \"score\": 14, \"weaknesses\": [\" thin title \", \"\"], \"reasoning\": \"ok\",}\n```",
        );
        let descriptor = thorough_panel().remove(2);
        let request = GenerationRequest::new("Tokio");
        let run = AgentRun {
            content: "Body",
            request: &request,
            iteration: 2,
            min_score: 7.0,
        };

        let review = run_agent(&provider, &descriptor, &run, &RunContext::detached())
            .await
            .unwrap();
        assert_eq!(review.role, "seo");
        assert_eq!(review.iteration, 2);
        assert_eq!(review.score, 10.0);
        assert!(!review.passed);
        assert_eq!(review.weaknesses, vec!["thin title"]);
    }

    #[tokio::test]
    async fn test_run_agent_missing_passed_uses_threshold() {
        let provider = ScriptedProvider::new().reply("agent:editor", r#"{"score": 7.5}"#);
        let descriptor = fast_panel().remove(0);
        let request = GenerationRequest::new("Tokio");
        let run = AgentRun {
            content: "Body",
            request: &request,
            iteration: 1,
            min_score: 7.0,
        };

        let review = run_agent(&provider, &descriptor, &run, &RunContext::detached())
            .await
            .unwrap();
        assert!(review.passed);
    }

    #[tokio::test]
    async fn test_run_agent_unparseable_is_error() {
        let provider = ScriptedProvider::new().reply("agent:editor", "Looks great to me!");
        let descriptor = fast_panel().remove(0);
        let request = GenerationRequest::new("Tokio");
        let run = AgentRun {
            content: "Body",
            request: &request,
            iteration: 1,
            min_score: 7.0,
        };

        let err = run_agent(&provider, &descriptor, &run, &RunContext::detached())
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::Pipeline { .. }));
        assert!(err.is_recoverable());
    }
}

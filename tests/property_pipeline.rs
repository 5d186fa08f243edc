//! Property tests for the review loop bounds and chunked assembly

use async_trait::async_trait;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use draftsmith::ai::{Completion, CompletionRequest};
use draftsmith::config::ReviewSettings;
use draftsmith::pipeline::generator::{ChunkedGenerator, Generator, GeneratorSettings};
use draftsmith::pipeline::reviewer::{PanelReviewer, Reviewer, fast_panel};
use draftsmith::pipeline::{RunContext, SectionPlanner};
use draftsmith::types::{QualityGateVerdict, assemble_sections};
use draftsmith::{GenerationRequest, ModelProvider, Result, SectionSpec};

/// Editor scores come from a fixed sequence, one per round
struct ScoreSequence {
    scores: Vec<f32>,
    next: AtomicUsize,
}

#[async_trait]
impl ModelProvider for ScoreSequence {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        if request.label == "revision" {
            return Ok(Completion::text_only("Revised body text."));
        }
        let i = self.next.fetch_add(1, Ordering::SeqCst);
        let score = self.scores[i % self.scores.len()];
        Ok(Completion::text_only(format!(r#"{{"score": {}}}"#, score)))
    }

    fn name(&self) -> &str {
        "sequence"
    }

    fn model(&self) -> &str {
        "sequence-1"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Replies to `section:{title}` with the scripted body
struct SectionEcho {
    bodies: HashMap<String, String>,
}

#[async_trait]
impl ModelProvider for SectionEcho {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let title = request.label.trim_start_matches("section:");
        Ok(Completion::text_only(
            self.bodies.get(title).cloned().unwrap_or_default(),
        ))
    }

    fn name(&self) -> &str {
        "echo"
    }

    fn model(&self) -> &str {
        "echo-1"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the loop never exceeds its cap and approval matches the threshold
    #[test]
    fn prop_review_loop_bounds(
        scores in prop::collection::vec(1.0f32..10.0, 1..6),
        min_score in 1.0f32..10.0,
        max_iterations in 1usize..5,
        auto_revise in any::<bool>(),
    ) {
        let provider = Arc::new(ScoreSequence { scores, next: AtomicUsize::new(0) });
        let settings = ReviewSettings {
            min_score,
            max_iterations,
            auto_revise,
            ..ReviewSettings::default()
        };
        let reviewer = PanelReviewer::new(provider, fast_panel(), settings, 1024);

        let result = runtime()
            .block_on(reviewer.review(
                "Draft body.",
                &GenerationRequest::new("Tokio"),
                &RunContext::detached(),
            ))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(result.iterations >= 1);
        prop_assert!(result.iterations as usize <= max_iterations);
        prop_assert_eq!(result.score_history.len(), result.iterations as usize);
        prop_assert_eq!(result.score_history.last().copied(), Some(result.final_score));
        prop_assert_eq!(result.approved, result.final_score >= min_score);

        if result.approved {
            prop_assert_eq!(result.verdict, QualityGateVerdict::Passed);
        }
        if !auto_revise {
            prop_assert_eq!(result.iterations, 1);
        }
        // No round runs after a passing one
        let earlier = &result.score_history[..result.score_history.len() - 1];
        prop_assert!(earlier.iter().all(|s| *s < min_score));
    }

    /// Property: concatenating the kept sections reproduces the draft
    #[test]
    fn prop_chunked_round_trip(
        bodies in prop::collection::vec("[A-Za-z][a-z]{0,8}( [a-z]{1,8}){0,20}\\.", 1..7),
    ) {
        let sections: Vec<SectionSpec> = (0..bodies.len())
            .map(|i| SectionSpec::new(format!("Part {}", i + 1), "Write it", 1, 200))
            .collect();
        let provider = Arc::new(SectionEcho {
            bodies: sections
                .iter()
                .map(|s| s.title.clone())
                .zip(bodies.iter().cloned())
                .collect(),
        });
        let generator = ChunkedGenerator::new(
            provider,
            SectionPlanner::new(),
            GeneratorSettings::default(),
        );
        let request = GenerationRequest::new("Tokio").with_sections(sections);

        let draft = runtime()
            .block_on(generator.generate(&request, &RunContext::detached()))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(&draft.content, &assemble_sections(&draft.sections));
        prop_assert_eq!(draft.sections.len(), bodies.len());
        for (i, (section, body)) in draft.sections.iter().zip(&bodies).enumerate() {
            prop_assert_eq!(section.index, i);
            prop_assert_eq!(&section.body, body);
        }
    }
}

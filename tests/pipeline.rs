//! End-to-end workflows through `PipelineFacade` with a scripted provider

mod common;

use std::sync::Arc;

use common::{CALL_COST_MICROS, ScriptedProvider};
use draftsmith::types::{GenerationMode, PublishBlocker, QualityGateVerdict, assemble_sections};
use draftsmith::{
    Config, Cost, GenerationRequest, PipelineFacade, RetryPolicy, SectionPlanner, SectionSpec,
    Strategy, WordBounds,
};

const CLEAN_BODY: &str = "Tokio schedules tasks cooperatively. Each task yields at await points, \
    which lets one worker thread interleave many connections without blocking. That is cheap. \
    A task that never yields stalls its worker and everything queued behind it, so heavy \
    computation belongs on a blocking pool. Measure before you tune.";

const SLOPPY_BODY: &str = "In today's fast-paced world, we delve into Tokio. \
    It's important to note that Tokio is a game-changer. Let us delve into the ever-evolving landscape. \
    In conclusion, Tokio plays a crucial role. It is a testament to Rust.";

fn config(strategy: Strategy) -> Config {
    let mut config = Config::default();
    config.pipeline.strategy = strategy;
    config.pipeline.retry = RetryPolicy::none();
    config
}

fn facade(provider: &Arc<ScriptedProvider>, config: &Config) -> PipelineFacade {
    PipelineFacade::new(provider.clone(), config).expect("valid config")
}

// =============================================================================
// Tutorial plan drives chunked generation
// =============================================================================

#[tokio::test]
async fn tutorial_draft_follows_default_plan() {
    let provider = Arc::new(ScriptedProvider::new().on("section:", CLEAN_BODY));
    let facade = facade(&provider, &config(Strategy::Thorough));
    let request = GenerationRequest::new("Tokio").with_content_type("tutorial");

    let draft = facade.generate(&request).await.unwrap();

    let expected = [
        "Introduction",
        "Prerequisites",
        "Step-by-Step Guide",
        "Common Issues",
        "Conclusion",
    ];
    let titles: Vec<&str> = draft.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, expected);
    assert_eq!(
        SectionPlanner::new().plan(&request).titles(),
        expected.to_vec()
    );

    let labels: Vec<String> = expected.iter().map(|t| format!("section:{}", t)).collect();
    assert_eq!(provider.calls(), labels);

    assert_eq!(draft.metadata.mode, GenerationMode::Chunked);
    assert_eq!(draft.metadata.calls, 5);
    assert_eq!(draft.content, assemble_sections(&draft.sections));
    assert_eq!(draft.metadata.cost, Cost::from_micros(5 * CALL_COST_MICROS));
}

// =============================================================================
// Auto-revise off means exactly one round
// =============================================================================

#[tokio::test]
async fn review_without_auto_revise_runs_once() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("section:", CLEAN_BODY)
            .agents_score(3.0),
    );
    let mut config = config(Strategy::Thorough);
    config.review.auto_revise = false;
    config.review.max_iterations = 3;
    let facade = facade(&provider, &config);

    let outcome = facade
        .generate_and_review(&GenerationRequest::new("Tokio"))
        .await
        .unwrap();

    assert_eq!(outcome.review.iterations, 1);
    assert!(!outcome.review.approved);
    assert_eq!(outcome.review.verdict, QualityGateVerdict::ReviseDisabled);
    assert_eq!(outcome.review.reviews.len(), 5);
    assert_eq!(provider.count("revision"), 0);
    assert!(!outcome.review.was_revised());
}

// =============================================================================
// Iteration cap reached below threshold
// =============================================================================

#[tokio::test]
async fn review_stops_at_iteration_cap_without_error() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("section:", CLEAN_BODY)
            .on("revision", format!("## Revised\n\n{}", CLEAN_BODY))
            .agents_score(5.0),
    );
    let mut config = config(Strategy::Thorough);
    config.review.max_iterations = 2;
    config.review.min_score = 7.0;
    let facade = facade(&provider, &config);

    let outcome = facade
        .generate_and_review(&GenerationRequest::new("Tokio"))
        .await
        .unwrap();

    let review = &outcome.review;
    assert_eq!(review.iterations, 2);
    assert!(!review.approved);
    assert_eq!(review.final_score, 5.0);
    assert_eq!(review.score_history, vec![5.0, 5.0]);
    assert_eq!(review.verdict, QualityGateVerdict::Exhausted);
    // Revision happens between rounds only
    assert_eq!(provider.count("revision"), 1);
    assert_eq!(provider.count("agent:"), 10);
    assert!(review.was_revised());
    assert_eq!(outcome.draft.metadata.quality_score, Some(5.0));
}

// =============================================================================
// Approved but blocked by slop
// =============================================================================

#[tokio::test]
async fn approved_draft_with_slop_is_not_publish_ready() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("draft", format!("# Tokio\n\n{}", SLOPPY_BODY))
            .agents_score(9.0),
    );
    let facade = facade(&provider, &config(Strategy::Fast));
    let request = GenerationRequest::new("Tokio").with_word_bounds(WordBounds::new(10, 2000));

    let outcome = facade.generate_and_publish(&request).await.unwrap();
    let result = &outcome.result;

    assert!(result.approved);
    assert!(!result.publish_ready);
    let slop = result.slop.as_ref().unwrap();
    assert!(slop.quality_score < 70.0);
    assert!(slop.matched_phrases.iter().any(|p| p == "delve into"));
    assert!(matches!(
        result.blockers.as_slice(),
        [PublishBlocker::SlopQuality { .. }]
    ));
}

// =============================================================================
// Full pipeline and accounting
// =============================================================================

#[tokio::test]
async fn clean_thorough_run_is_publish_ready() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("section:", CLEAN_BODY)
            .agents_score(8.0),
    );
    let facade = facade(&provider, &config(Strategy::Thorough));
    let request = GenerationRequest::new("Tokio scheduling")
        .with_keywords(["tokio", "async"])
        .with_word_bounds(WordBounds::new(50, 1000));

    let outcome = facade.generate_and_publish(&request).await.unwrap();
    let result = &outcome.result;

    assert!(result.approved, "{:?}", result.blockers);
    assert!(result.publish_ready, "{:?}", result.blockers);
    assert_eq!(result.iterations, 1);
    assert_eq!(result.final_score, Some(8.0));
    assert_eq!(result.seo.title, "Tokio scheduling");
    assert_eq!(result.seo.slug, "tokio-scheduling");
    assert!(result.seo.keywords.starts_with(&["tokio".to_string(), "async".to_string()]));
    assert!(result.readability_score > 0.0);

    // 5 article sections + 5 agents
    let calls = provider.calls().len() as u64;
    assert_eq!(calls, 10);
    assert_eq!(outcome.usage.calls as u64, calls);
    assert_eq!(outcome.total_cost, Cost::from_micros(calls * CALL_COST_MICROS));
    assert_eq!(outcome.usage.input_tokens, calls * 200);
}

#[tokio::test]
async fn concurrent_invocations_keep_separate_ledgers() {
    let provider = Arc::new(
        ScriptedProvider::new()
            .on("draft", CLEAN_BODY)
            .agents_score(8.0),
    );
    let facade = facade(&provider, &config(Strategy::Fast));
    let a = GenerationRequest::new("Tokio").with_word_bounds(WordBounds::new(10, 1000));
    let b = GenerationRequest::new("Rayon").with_word_bounds(WordBounds::new(10, 1000));

    let (first, second) = tokio::join!(
        facade.generate_and_publish(&a),
        facade.generate_and_publish(&b)
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    // draft + editor each
    assert_eq!(first.usage.calls, 2);
    assert_eq!(second.usage.calls, 2);
    assert_eq!(first.total_cost, Cost::from_micros(2 * CALL_COST_MICROS));
    assert_ne!(first.usage.invocation_id, second.usage.invocation_id);
}

#[tokio::test]
async fn section_failure_fails_the_draft() {
    let provider = Arc::new(ScriptedProvider::new().fail_on("section:Conclusion"));
    let facade = facade(&provider, &config(Strategy::Thorough));

    let err = facade
        .generate_and_publish(&GenerationRequest::new("Tokio").with_content_type("tutorial"))
        .await
        .unwrap_err();

    assert!(err.is_recoverable());
    assert_eq!(provider.count("agent:"), 0);
}

#[tokio::test]
async fn review_of_supplied_content() {
    let provider = Arc::new(ScriptedProvider::new().agents_score(8.0));
    let facade = facade(&provider, &config(Strategy::Fast));

    let reviewed = facade
        .review_content(
            CLEAN_BODY,
            &GenerationRequest::new("Tokio"),
            &tokio_util::sync::CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(reviewed.review.approved);
    assert_eq!(reviewed.review.original_content, CLEAN_BODY);
    assert_eq!(provider.calls(), vec!["agent:editor"]);
    assert_eq!(reviewed.usage.calls, 1);
}

#[tokio::test]
async fn oversized_explicit_sections_do_not_panic() {
    let provider = Arc::new(ScriptedProvider::new());
    let facade = facade(&provider, &config(Strategy::Thorough));
    let request = GenerationRequest::new("Tokio").with_sections(vec![
        SectionSpec::new("A", "a", 10, u32::MAX),
        SectionSpec::new("B", "b", 10, 20),
    ]);

    let draft = facade.generate(&request).await.unwrap();

    assert_eq!(provider.calls(), vec!["section:A", "section:B"]);
    assert_eq!(draft.content, assemble_sections(&draft.sections));
}

#[tokio::test]
async fn cancel_all_leaves_facade_usable() {
    let provider = Arc::new(
        ScriptedProvider::new().with_delay(std::time::Duration::from_millis(100)),
    );
    let facade = Arc::new(facade(&provider, &config(Strategy::Fast)));

    let in_flight = {
        let facade = Arc::clone(&facade);
        tokio::spawn(async move { facade.generate(&GenerationRequest::new("Tokio")).await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    facade.cancel_all();
    assert!(in_flight.await.unwrap().unwrap_err().is_cancelled());

    let later = facade
        .generate(&GenerationRequest::new("Later request"))
        .await
        .unwrap();
    assert_eq!(later.metadata.mode, GenerationMode::SinglePass);
}

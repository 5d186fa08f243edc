//! Publishing
//!
//! `Publisher` chains generation and optional review, then derives SEO
//! metadata, readability and a slop report from the final content and
//! decides `publish_ready`:
//!
//! ```text
//! publish_ready = approved
//!              && slop.quality_score >= min_slop_quality   (when slop detection is on)
//!              && word_count within bounds
//! ```
//!
//! Every failed condition is listed in `PublishResult::blockers`. Nothing is
//! persisted here; the caller owns the result.

pub mod readability;
pub mod seo;
pub mod slop;

pub use readability::flesch_reading_ease;
pub use slop::detect_slop;

use std::collections::BTreeMap;
use tracing::info;

use super::context::RunContext;
use super::generator::SharedGenerator;
use super::reviewer::SharedReviewer;
use super::sections::normalize_key;
use crate::config::{ContentTypeConfig, PublishSettings};
use crate::constants::review::DEFAULT_MIN_SCORE;
use crate::types::{
    GeneratedDraft, GenerationRequest, PublishBlocker, PublishResult, Result, ReviewResult,
    WordBounds, word_count,
};

pub struct Publisher {
    generator: SharedGenerator,
    reviewer: Option<SharedReviewer>,
    settings: PublishSettings,
    content_bounds: BTreeMap<String, WordBounds>,
}

impl Publisher {
    pub fn new(
        generator: SharedGenerator,
        reviewer: Option<SharedReviewer>,
        settings: PublishSettings,
    ) -> Self {
        Self {
            generator,
            reviewer,
            settings,
            content_bounds: BTreeMap::new(),
        }
    }

    /// Use the word bounds declared per content type
    pub fn with_content_bounds(mut self, content_types: &BTreeMap<String, ContentTypeConfig>) -> Self {
        self.content_bounds = content_types
            .iter()
            .filter_map(|(key, cfg)| cfg.word_bounds.map(|bounds| (normalize_key(key), bounds)))
            .collect();
        self
    }

    /// Bounds for the word-count gate: request, then content type, then target ± tolerance
    pub fn word_bounds(&self, request: &GenerationRequest) -> WordBounds {
        request
            .word_bounds
            .or_else(|| {
                self.content_bounds
                    .get(&normalize_key(&request.content_type))
                    .copied()
            })
            .unwrap_or_else(|| WordBounds::around(request.target_words, self.settings.word_tolerance))
    }

    fn min_score(&self) -> f32 {
        self.reviewer
            .as_ref()
            .map(|r| r.settings().min_score)
            .unwrap_or(DEFAULT_MIN_SCORE)
    }

    /// Generate, review when a reviewer is configured, and assess
    pub async fn publish(&self, request: &GenerationRequest, ctx: &RunContext) -> Result<PublishResult> {
        let draft = self.generator.generate(request, ctx).await?;

        let review = match &self.reviewer {
            Some(reviewer) => Some(reviewer.review(&draft.content, request, ctx).await?),
            None => None,
        };

        Ok(self.assess(request, draft, review))
    }

    /// Derive metadata and the publish verdict from finished stage outputs
    pub fn assess(
        &self,
        request: &GenerationRequest,
        mut draft: GeneratedDraft,
        review: Option<ReviewResult>,
    ) -> PublishResult {
        let min_score = self.min_score();

        let (final_content, reviews, final_score, iterations, approved) = match review {
            Some(review) => {
                draft.metadata.quality_score = Some(review.final_score);
                (
                    review.final_content,
                    review.reviews,
                    Some(review.final_score),
                    review.iterations,
                    review.approved,
                )
            }
            None => (draft.content.clone(), Vec::new(), None, 0, false),
        };

        let seo = seo::synthesize(&final_content, request);
        let readability_score = flesch_reading_ease(&final_content);
        let words = word_count(&final_content);
        let word_bounds = self.word_bounds(request);
        let slop = self.settings.detect_slop.then(|| detect_slop(&final_content));

        let mut blockers = Vec::new();
        if !approved {
            blockers.push(PublishBlocker::NotApproved {
                score: final_score,
                min_score,
            });
        }
        if let Some(report) = &slop
            && report.quality_score < self.settings.min_slop_quality
        {
            blockers.push(PublishBlocker::SlopQuality {
                score: report.quality_score,
                minimum: self.settings.min_slop_quality,
            });
        }
        if !word_bounds.contains(words) {
            blockers.push(PublishBlocker::WordCount {
                actual: words,
                bounds: word_bounds,
            });
        }

        let publish_ready = blockers.is_empty();
        info!(
            topic = %request.topic,
            approved,
            publish_ready,
            words,
            readability = %format!("{:.1}", readability_score),
            blockers = blockers.len(),
            "Publish assessment"
        );

        PublishResult {
            topic: request.topic.clone(),
            original_draft: draft,
            final_content,
            reviews,
            final_score,
            iterations,
            seo,
            readability_score,
            word_count: words,
            word_bounds,
            approved,
            publish_ready,
            slop,
            blockers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewSettings;
    use crate::pipeline::generator::test_support::ScriptedProvider;
    use crate::pipeline::generator::{GeneratorSettings, SinglePassGenerator};
    use crate::pipeline::reviewer::{PanelReviewer, fast_panel};
    use std::sync::Arc;

    const CLEAN: &str = "# Tokio Basics\n\nTokio schedules tasks cooperatively. Each task yields at \
        await points, which lets one worker thread interleave many connections. That is cheap. \
        A task that never yields stalls its worker and every task queued behind it. Measure first.";

    const SLOPPY: &str = "# Tokio\n\nIn today's fast-paced world, we delve into Tokio. \
        It's important to note that Tokio is a game-changer. Let us delve into the ever-evolving landscape. \
        In conclusion, Tokio plays a crucial role. It is a testament to Rust.";

    fn publisher(reply: &str, editor_score: f32) -> Publisher {
        let provider = Arc::new(
            ScriptedProvider::new().reply("draft", reply).reply(
                "agent:editor",
                &format!(r#"{{"score": {}, "weaknesses": []}}"#, editor_score),
            ),
        );
        let generator = Arc::new(SinglePassGenerator::new(
            provider.clone(),
            GeneratorSettings::default(),
        ));
        let reviewer = Arc::new(PanelReviewer::new(
            provider,
            fast_panel(),
            ReviewSettings::default(),
            4096,
        ));
        Publisher::new(generator, Some(reviewer), PublishSettings::default())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Tokio").with_word_bounds(WordBounds::new(10, 500))
    }

    #[tokio::test]
    async fn test_clean_approved_draft_is_ready() {
        let result = publisher(CLEAN, 8.5)
            .publish(&request(), &RunContext::detached())
            .await
            .unwrap();
        assert!(result.approved);
        assert!(result.publish_ready, "{:?}", result.blockers);
        assert_eq!(result.seo.title, "Tokio Basics");
        assert_eq!(result.final_score, Some(8.5));
        assert_eq!(result.original_draft.metadata.quality_score, Some(8.5));
    }

    #[tokio::test]
    async fn test_slop_blocks_approved_draft() {
        let result = publisher(SLOPPY, 9.0)
            .publish(&request(), &RunContext::detached())
            .await
            .unwrap();
        assert!(result.approved);
        assert!(!result.publish_ready);
        let slop = result.slop.as_ref().unwrap();
        assert!(slop.quality_score < 70.0);
        assert!(matches!(
            result.blockers.as_slice(),
            [PublishBlocker::SlopQuality { .. }]
        ));
    }

    #[tokio::test]
    async fn test_word_bounds_gate() {
        let request = GenerationRequest::new("Tokio").with_word_bounds(WordBounds::new(500, 900));
        let result = publisher(CLEAN, 9.0)
            .publish(&request, &RunContext::detached())
            .await
            .unwrap();
        assert!(result.approved);
        assert!(!result.publish_ready);
        assert!(matches!(
            result.blockers.as_slice(),
            [PublishBlocker::WordCount { .. }]
        ));
    }

    #[test]
    fn test_no_review_is_not_approved() {
        let provider = Arc::new(ScriptedProvider::new());
        let generator = Arc::new(SinglePassGenerator::new(provider, GeneratorSettings::default()));
        let publisher = Publisher::new(generator, None, PublishSettings::default());
        let draft = GeneratedDraft {
            content: CLEAN.to_string(),
            metadata: crate::types::DraftMetadata {
                word_count: word_count(CLEAN),
                input_tokens: 0,
                output_tokens: 0,
                cost: crate::types::Cost::ZERO,
                model: "m".into(),
                provider: "p".into(),
                mode: crate::types::GenerationMode::SinglePass,
                calls: 1,
                generated_at: chrono::Utc::now(),
                quality_score: None,
                plan_bounds: None,
            },
            sections: vec![],
        };

        let result = publisher.assess(&request(), draft, None);
        assert!(!result.approved);
        assert!(!result.publish_ready);
        assert_eq!(result.iterations, 0);
        assert_eq!(
            result.blockers[0],
            PublishBlocker::NotApproved {
                score: None,
                min_score: 7.0
            }
        );
    }

    #[test]
    fn test_word_bounds_resolution_order() {
        let provider = Arc::new(ScriptedProvider::new());
        let generator = Arc::new(SinglePassGenerator::new(provider, GeneratorSettings::default()));
        let mut content_types = BTreeMap::new();
        content_types.insert(
            "Tutorial".to_string(),
            ContentTypeConfig {
                sections: None,
                word_bounds: Some(WordBounds::new(1000, 2000)),
            },
        );
        let publisher = Publisher::new(generator, None, PublishSettings::default())
            .with_content_bounds(&content_types);

        let base = GenerationRequest::new("x").with_target_words(1000);
        assert_eq!(publisher.word_bounds(&base), WordBounds::new(600, 1400));

        let tutorial = base.clone().with_content_type("tutorial");
        assert_eq!(publisher.word_bounds(&tutorial), WordBounds::new(1000, 2000));

        let explicit = tutorial.with_word_bounds(WordBounds::new(1, 2));
        assert_eq!(publisher.word_bounds(&explicit), WordBounds::new(1, 2));
    }
}

//! Section planning
//!
//! Maps a content-type key to an ordered `SectionPlan`. Resolution order:
//! explicit sections on the request, then configured overrides, then the
//! built-in table. Unknown keys fall back to the article plan.
//!
//! Planning is pure: no I/O, no provider calls.

use std::collections::BTreeMap;

use crate::config::ContentTypeConfig;
use crate::constants::request::DEFAULT_CONTENT_TYPE;
use crate::types::{GenerationRequest, SectionPlan, SectionSpec};

/// Content types with a built-in plan
pub const BUILT_IN_CONTENT_TYPES: [&str; 4] = ["tutorial", "guide", "article", "case-study"];

type Row = (&'static str, &'static str, u32, u32);

const TUTORIAL: [Row; 5] = [
    (
        "Introduction",
        "Explain what the reader will build or learn and why it matters.",
        100,
        150,
    ),
    (
        "Prerequisites",
        "List the tools, versions and prior knowledge the reader needs.",
        80,
        120,
    ),
    (
        "Step-by-Step Guide",
        "Walk through the task in numbered steps with code or commands where useful.",
        400,
        600,
    ),
    (
        "Common Issues",
        "Describe the mistakes readers usually hit and how to fix each one.",
        150,
        250,
    ),
    (
        "Conclusion",
        "Summarize what was achieved and suggest concrete next steps.",
        80,
        120,
    ),
];

const GUIDE: [Row; 5] = [
    (
        "Overview",
        "State the scope of the guide and who it is for.",
        100,
        150,
    ),
    (
        "Key Concepts",
        "Define the core ideas the rest of the guide relies on.",
        150,
        250,
    ),
    (
        "Detailed Walkthrough",
        "Cover the subject in depth, in the order a practitioner would apply it.",
        350,
        500,
    ),
    (
        "Best Practices",
        "Give specific, actionable recommendations and the pitfalls they avoid.",
        150,
        250,
    ),
    (
        "Summary",
        "Recap the main points in a few sentences.",
        60,
        100,
    ),
];

const ARTICLE: [Row; 5] = [
    (
        "Introduction",
        "Open with the question or problem the article addresses.",
        80,
        120,
    ),
    (
        "Background",
        "Give the context a reader needs to follow the discussion.",
        120,
        180,
    ),
    (
        "Main Discussion",
        "Develop the central argument with evidence and examples.",
        300,
        450,
    ),
    (
        "Practical Implications",
        "Explain what the reader should do differently as a result.",
        120,
        180,
    ),
    (
        "Conclusion",
        "Close with the key takeaway.",
        60,
        100,
    ),
];

const CASE_STUDY: [Row; 5] = [
    (
        "Executive Summary",
        "Summarize the situation, the approach and the outcome in one paragraph.",
        80,
        120,
    ),
    (
        "Challenge",
        "Describe the problem, its constraints and why it was hard.",
        120,
        180,
    ),
    (
        "Approach",
        "Explain what was done, in order, and the reasoning behind each decision.",
        250,
        400,
    ),
    (
        "Results",
        "Report measurable outcomes and compare them with the starting point.",
        120,
        200,
    ),
    (
        "Lessons Learned",
        "List what would be repeated and what would be done differently.",
        80,
        150,
    ),
];

fn built_in(content_type: &str) -> Option<SectionPlan> {
    let rows: &[Row] = match content_type {
        "tutorial" => &TUTORIAL,
        "guide" => &GUIDE,
        "article" => &ARTICLE,
        "case-study" => &CASE_STUDY,
        _ => return None,
    };

    Some(SectionPlan::new(
        rows.iter()
            .map(|(title, instruction, min, max)| SectionSpec::new(*title, *instruction, *min, *max))
            .collect(),
    ))
}

/// Normalize a content-type key: trim, lowercase, spaces and underscores to hyphens
pub(crate) fn normalize_key(content_type: &str) -> String {
    content_type
        .trim()
        .to_lowercase()
        .replace([' ', '_'], "-")
}

// =============================================================================
// Section Planner
// =============================================================================

/// Content-type → section plan lookup
#[derive(Debug, Clone, Default)]
pub struct SectionPlanner {
    overrides: BTreeMap<String, SectionPlan>,
}

impl SectionPlanner {
    /// Planner with the built-in table only
    pub fn new() -> Self {
        Self::default()
    }

    /// Planner whose configured content types replace or extend the built-in table
    pub fn with_overrides(content_types: &BTreeMap<String, ContentTypeConfig>) -> Self {
        let overrides = content_types
            .iter()
            .filter_map(|(key, cfg)| {
                cfg.sections
                    .as_ref()
                    .map(|sections| (normalize_key(key), SectionPlan::new(sections.clone())))
            })
            .collect();
        Self { overrides }
    }

    /// Plan for a content-type key, falling back to the article plan
    pub fn plan_for(&self, content_type: &str) -> SectionPlan {
        let key = normalize_key(content_type);

        if let Some(plan) = self.overrides.get(&key) {
            return plan.clone();
        }

        built_in(&key)
            .or_else(|| {
                tracing::debug!(content_type = %key, "Unknown content type, using article plan");
                self.overrides
                    .get(DEFAULT_CONTENT_TYPE)
                    .cloned()
                    .or_else(|| built_in(DEFAULT_CONTENT_TYPE))
            })
            .unwrap_or_else(|| SectionPlan::new(Vec::new()))
    }

    /// Plan for a request: explicit sections win over the content-type table
    pub fn plan(&self, request: &GenerationRequest) -> SectionPlan {
        match &request.sections {
            Some(sections) if !sections.is_empty() => SectionPlan::new(sections.clone()),
            _ => self.plan_for(&request.content_type),
        }
    }

    /// Every content-type key this planner resolves without falling back
    pub fn content_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = BUILT_IN_CONTENT_TYPES.iter().map(|k| k.to_string()).collect();
        for key in self.overrides.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }
}

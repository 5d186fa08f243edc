//! Review and revision prompts

use super::agents::AgentDescriptor;
use super::revision::RevisionFeedback;
use crate::types::GenerationRequest;

/// System instruction shared by all critique agents, specialized by focus
pub fn agent_system_prompt(descriptor: &AgentDescriptor) -> String {
    format!(
        "You are the {}, one member of an editorial review panel.\n\
         Your focus: {}\n\
         Judge only your focus area. Be specific: quote or point to the passage \
         behind every weakness. Respond with a single JSON object and nothing else.",
        descriptor.name, descriptor.focus
    )
}

pub fn agent_prompt(
    descriptor: &AgentDescriptor,
    content: &str,
    request: &GenerationRequest,
    min_score: f32,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Context\n\n");
    prompt.push_str(&format!("**Topic**: {}\n", request.topic));
    prompt.push_str(&format!("**Content type**: {}\n", request.content_type));
    prompt.push_str(&format!("**Audience**: {}\n", request.tone));
    if !request.keywords.is_empty() {
        prompt.push_str(&format!("**Keywords**: {}\n", request.keywords.join(", ")));
    }

    prompt.push_str("\n# Draft\n\n");
    prompt.push_str(content);
    prompt.push_str("\n\n");

    prompt.push_str(&format!("# Review ({})\n\n", descriptor.role));
    prompt.push_str(&format!(
        "Score the draft from 1 to 10 for your focus area. A score of {:.1} or \
         higher means it is ready to publish in that respect.\n\n",
        min_score
    ));
    prompt.push_str(
        "Return JSON with exactly these fields:\n\
         ```json\n\
         {\n  \
           \"passed\": true,\n  \
           \"score\": 8,\n  \
           \"strengths\": [\"...\"],\n  \
           \"weaknesses\": [\"...\"],\n  \
           \"improvements\": [\"concrete change to make\"],\n  \
           \"reasoning\": \"one short paragraph\"\n\
         }\n\
         ```\n",
    );
    prompt
}

pub fn revision_system_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are a senior editor revising {} content for a {} audience. \
         Apply the reviewers' feedback while keeping everything that already works. \
         Keep the Markdown heading structure. Return only the revised document.",
        request.content_type, request.tone
    )
}

pub fn revision_prompt(
    content: &str,
    request: &GenerationRequest,
    feedback: &RevisionFeedback,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Task\n\n");
    prompt.push_str(&format!(
        "Revise this draft about **{}**. It scored {:.1}; the target is {:.1}.\n",
        request.topic, feedback.score, feedback.target
    ));
    prompt.push_str(&format!(
        "Stay close to {} words.\n\n",
        request.target_words
    ));

    if !feedback.weaknesses.is_empty() {
        prompt.push_str("# Weaknesses\n\n");
        for item in &feedback.weaknesses {
            prompt.push_str(&format!("- {}\n", item));
        }
        prompt.push('\n');
    }

    if !feedback.improvements.is_empty() {
        prompt.push_str("# Requested Improvements\n\n");
        for item in &feedback.improvements {
            prompt.push_str(&format!("- {}\n", item));
        }
        prompt.push('\n');
    }

    prompt.push_str("# Draft\n\n");
    prompt.push_str(content);
    prompt.push('\n');
    prompt
}

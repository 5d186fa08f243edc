//! Generation Prompts
//!
//! Prompt builders for single-pass and per-section generation.
//!
//! 1. **Role**: the system prompt fixes the writer persona and tone
//! 2. **Scope**: section prompts name the full outline but ask for one section only
//! 3. **Length**: every prompt states explicit word bounds

use crate::constants::generation::{TOKEN_HEADROOM, TOKENS_PER_WORD};
use crate::types::{GenerationRequest, SectionSpec};

/// Output-token budget for `words` words, capped by the provider limit
pub fn max_tokens_for(words: u32, cap: u32) -> u32 {
    let budget = ((words as f32 * TOKENS_PER_WORD).ceil() as u32).saturating_add(TOKEN_HEADROOM);
    budget.min(cap).max(1)
}

pub fn system_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are an experienced technical writer producing {} content in the {} category.\n\
         {}\n\
         Write in plain, specific language. Prefer concrete examples over generalities. \
         Do not use filler openings, hype or hedging. Output Markdown only, with no preamble \
         or closing remarks about the writing itself.",
        request.content_type,
        request.category,
        request.tone.guidance()
    )
}

fn push_keywords(prompt: &mut String, request: &GenerationRequest) {
    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            "**Keywords to cover naturally**: {}\n",
            request.keywords.join(", ")
        ));
    }
}

/// Prompt for a whole document in one call
pub fn single_pass_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Task\n\n");
    prompt.push_str(&format!(
        "Write a complete {} about **{}**.\n\n",
        request.content_type, request.topic
    ));
    prompt.push_str(&format!(
        "**Length**: about {} words.\n",
        request.target_words
    ));
    prompt.push_str(&format!("**Audience**: {}\n", request.tone));
    push_keywords(&mut prompt, request);

    if let Some(sections) = &request.sections {
        prompt.push_str("\n# Required Structure\n\n");
        for section in sections {
            prompt.push_str(&format!(
                "- ## {} ({}-{} words): {}\n",
                section.title, section.min_words, section.max_words, section.instruction
            ));
        }
    }

    prompt.push_str(
        "\n# Format\n\n\
         Start with a single `# ` title line. Use `## ` headings for sections. \
         Return only the document.\n",
    );
    prompt
}

/// Prompt for one section of a chunked document
pub fn section_prompt(
    request: &GenerationRequest,
    section: &SectionSpec,
    index: usize,
    outline: &[&str],
) -> String {
    let mut prompt = String::new();

    prompt.push_str("# Document\n\n");
    prompt.push_str(&format!(
        "A {} about **{}**.\n",
        request.content_type, request.topic
    ));
    prompt.push_str(&format!("**Audience**: {}\n", request.tone));
    push_keywords(&mut prompt, request);

    prompt.push_str("\n**Outline**:\n");
    for (i, title) in outline.iter().enumerate() {
        let marker = if i == index { " ← write this one" } else { "" };
        prompt.push_str(&format!("{}. {}{}\n", i + 1, title, marker));
    }

    prompt.push_str(&format!("\n# Section: {}\n\n", section.title));
    prompt.push_str(&format!("{}\n\n", section.instruction));
    prompt.push_str(&format!(
        "**Length**: between {} and {} words.\n\n",
        section.min_words, section.max_words
    ));
    prompt.push_str(
        "# Format\n\n\
         Return only the body of this section. Do not repeat the section heading \
         and do not write other sections. `###` subheadings are allowed.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Tone;

    #[test]
    fn test_max_tokens_for() {
        assert_eq!(max_tokens_for(100, 10_000), 160 + 256);
        assert_eq!(max_tokens_for(100_000, 4096), 4096);
        assert_eq!(max_tokens_for(u32::MAX, 4096), 4096);
    }

    #[test]
    fn test_section_prompt_marks_current_section() {
        let request = GenerationRequest::new("Tokio runtime")
            .with_keywords(["async", "executor"])
            .with_tone(Tone::Beginner);
        let section = SectionSpec::new("Prerequisites", "List requirements", 80, 120);
        let prompt = section_prompt(&request, &section, 1, &["Introduction", "Prerequisites"]);

        assert!(prompt.contains("2. Prerequisites ← write this one"));
        assert!(prompt.contains("between 80 and 120 words"));
        assert!(prompt.contains("async, executor"));
        assert!(!prompt.contains("1. Introduction ←"));
    }

    #[test]
    fn test_single_pass_prompt_includes_structure() {
        let request = GenerationRequest::new("Tokio")
            .with_target_words(500)
            .with_sections(vec![SectionSpec::new("Setup", "Install", 50, 100)]);
        let prompt = single_pass_prompt(&request);
        assert!(prompt.contains("about 500 words"));
        assert!(prompt.contains("## Setup (50-100 words)"));
    }

    #[test]
    fn test_system_prompt_uses_tone() {
        let request = GenerationRequest::new("x").with_tone(Tone::Advanced);
        assert!(system_prompt(&request).contains(Tone::Advanced.guidance()));
    }
}

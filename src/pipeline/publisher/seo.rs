//! SEO metadata synthesis.
//!
//! Deterministic; no provider call. Title comes from the first H1, falling
//! back to the topic. Description is the first prose paragraph.

use crate::constants::publish::{MAX_DESCRIPTION_CHARS, MAX_SLUG_CHARS, MAX_TITLE_CHARS};
use crate::types::{GenerationRequest, SeoMetadata, capitalize_first, slugify, truncate_on_word_boundary};

pub fn synthesize(content: &str, request: &GenerationRequest) -> SeoMetadata {
    let title = first_heading(content)
        .map(str::to_string)
        .unwrap_or_else(|| capitalize_first(request.topic.trim()));
    let title = truncate_on_word_boundary(&title, MAX_TITLE_CHARS);

    let description = first_paragraph(content)
        .unwrap_or_else(|| format!("An overview of {}.", request.topic.trim()));
    let description = truncate_on_word_boundary(&description, MAX_DESCRIPTION_CHARS);

    let mut slug = slugify(&title, MAX_SLUG_CHARS);
    if slug.is_empty() {
        slug = slugify(&request.topic, MAX_SLUG_CHARS);
    }

    SeoMetadata {
        title,
        description,
        keywords: keywords(request),
        slug,
    }
}

/// Text of the first `# ` heading outside code blocks
fn first_heading(content: &str) -> Option<&str> {
    let mut in_fence = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence
            && let Some(text) = line.strip_prefix("# ")
        {
            let text = text.trim();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First paragraph of ordinary prose, with inline markup removed
fn first_paragraph(content: &str) -> Option<String> {
    let mut in_fence = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if line.is_empty() {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }

        let structural = line.starts_with(['#', '>', '|'])
            || ["- ", "* ", "+ "].iter().any(|marker| line.starts_with(marker))
            || line
                .split_once(". ")
                .is_some_and(|(n, _)| n.chars().all(|c| c.is_ascii_digit()))
            || !line.chars().any(char::is_alphanumeric);
        if structural {
            if !paragraph.is_empty() {
                break;
            }
            continue;
        }
        paragraph.push(line);
    }

    if paragraph.is_empty() {
        return None;
    }

    let text: String = paragraph
        .join(" ")
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Request keywords then the category, lowercased, without duplicates
fn keywords(request: &GenerationRequest) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for keyword in request
        .keywords
        .iter()
        .chain(std::iter::once(&request.category))
    {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !out.contains(&keyword) {
            out.push(keyword);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Getting Started with Tokio\n\n\
        ## Introduction\n\n\
        Tokio is an **asynchronous** runtime\nfor Rust.\n\n\
        It powers many services.\n";

    #[test]
    fn test_title_from_heading() {
        let seo = synthesize(DOC, &GenerationRequest::new("tokio"));
        assert_eq!(seo.title, "Getting Started with Tokio");
        assert_eq!(seo.slug, "getting-started-with-tokio");
        assert_eq!(seo.description, "Tokio is an asynchronous runtime for Rust.");
    }

    #[test]
    fn test_fallbacks_without_heading_or_prose() {
        let seo = synthesize("## Only\n\n- a list\n", &GenerationRequest::new("async rust"));
        assert_eq!(seo.title, "Async rust");
        assert_eq!(seo.slug, "async-rust");
        assert_eq!(seo.description, "An overview of async rust.");
    }

    #[test]
    fn test_lengths_are_capped() {
        let long_title = format!("# {}\n\n{}", "word ".repeat(40), "text ".repeat(100));
        let seo = synthesize(&long_title, &GenerationRequest::new("x"));
        assert!(seo.title.chars().count() <= MAX_TITLE_CHARS);
        assert!(seo.description.chars().count() <= MAX_DESCRIPTION_CHARS);
        assert!(seo.slug.len() <= MAX_SLUG_CHARS);
    }

    #[test]
    fn test_keywords_deduplicated() {
        let request = GenerationRequest::new("x")
            .with_keywords(["Rust", "async", "rust "])
            .with_category("Async");
        let seo = synthesize("text", &request);
        assert_eq!(seo.keywords, vec!["rust", "async"]);
    }

    #[test]
    fn test_heading_inside_code_ignored() {
        let doc = "```bash\n# install\n```\n\n# Real Title\n";
        assert_eq!(first_heading(doc), Some("Real Title"));
    }
}

//! Shared text utilities used across pipeline stages.
//!
//! ## Word Counting
//!
//! `word_count` is the single source of truth for draft length. Every stage
//! recomputes it from the content string instead of trusting earlier metadata.

// =============================================================================
// Word Counting
// =============================================================================

/// Count words in markdown content.
///
/// A word is a whitespace-separated token containing at least one
/// alphanumeric character, so heading markers, list bullets and horizontal
/// rules are not counted.
pub fn word_count(content: &str) -> usize {
    content
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Build a URL slug: lowercase ASCII alphanumerics joined by single hyphens.
pub fn slugify(s: &str, max_chars: usize) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_hyphen = false;

    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > max_chars {
        // Slug is pure ASCII here, so byte indexing is safe
        let on_boundary = slug.as_bytes()[max_chars] == b'-';
        slug.truncate(max_chars);
        // Never end on a partial word
        if !on_boundary && let Some(idx) = slug.rfind('-') {
            slug.truncate(idx);
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Truncate text to `max_chars` characters, cutting on a word boundary and
/// appending "..." when anything was removed.
pub fn truncate_on_word_boundary(s: &str, max_chars: usize) -> String {
    let trimmed = s.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }

    let budget = max_chars.saturating_sub(3);
    let mut out = String::new();
    for word in trimmed.split_whitespace() {
        let needed = if out.is_empty() {
            word.chars().count()
        } else {
            word.chars().count() + 1
        };
        if out.chars().count() + needed > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    if out.is_empty() {
        out = trimmed.chars().take(budget).collect();
    }
    let out = out.trim_end_matches([',', ';', ':', '.', '-']).to_string();
    format!("{}...", out)
}

/// Remove fenced code blocks (```...```) from markdown.
pub fn strip_code_blocks(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_fence = false;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

// =============================================================================
// Token Estimation
// =============================================================================

/// Rough token estimate for providers that omit usage data.
///
/// ~4 characters per token for ASCII, ~1.5 for everything else.
pub fn estimate_tokens(content: &str) -> u32 {
    if content.is_empty() {
        return 0;
    }
    let (ascii, other) = content.chars().fold((0usize, 0usize), |(a, o), c| {
        if c.is_ascii() { (a + 1, o) } else { (a, o + 1) }
    });
    ((ascii as f32 / 4.0) + (other as f32 / 1.5)).ceil() as u32
}

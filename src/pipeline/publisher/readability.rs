//! Flesch Reading Ease on Markdown prose.
//!
//! Code blocks and Markdown markers are removed before measuring. Scores are
//! clamped to 0..=100; higher is easier.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::utils::strip_code_blocks;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(\s|$)").expect("Invalid sentence regex"));

static MARKDOWN_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(#{1,6}\s+|[-*+]\s+|\d+\.\s+|>\s*)|[`*_\[\]()|]")
        .expect("Invalid markdown regex")
});

/// Markdown reduced to plain prose, one block per line
pub(crate) fn plain_prose(content: &str) -> String {
    let without_code = strip_code_blocks(content);
    MARKDOWN_NOISE.replace_all(&without_code, "").into_owned()
}

/// Split prose into sentences.
///
/// Headings and list items without terminal punctuation still end a sentence
/// at their line break.
pub(crate) fn sentences(prose: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in prose.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut last = 0;
        for m in SENTENCE_END.find_iter(line) {
            let sentence = line[last..m.end()].trim();
            if !sentence.is_empty() {
                out.push(sentence.to_string());
            }
            last = m.end();
        }
        let rest = line[last..].trim();
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
    }
    out
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().any(char::is_alphabetic))
}

/// Vowel-group syllable estimate, at least one per word
pub(crate) fn syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut previous_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    // Silent trailing e, except "-le" as in "table"
    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}

/// Flesch Reading Ease of Markdown content; 0 for content without prose
pub fn flesch_reading_ease(content: &str) -> f32 {
    let prose = plain_prose(content);
    let sentences = sentences(&prose);

    let (word_total, syllable_total) = sentences
        .iter()
        .flat_map(|s| words(s))
        .fold((0usize, 0usize), |(w, s), word| (w + 1, s + syllables(word)));

    if word_total == 0 || sentences.is_empty() {
        return 0.0;
    }

    let words_per_sentence = word_total as f32 / sentences.len() as f32;
    let syllables_per_word = syllable_total as f32 / word_total as f32;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syllables() {
        assert_eq!(syllables("cat"), 1);
        assert_eq!(syllables("table"), 2);
        assert_eq!(syllables("make"), 1);
        assert_eq!(syllables("readability"), 5);
        assert_eq!(syllables("x"), 1);
    }

    #[test]
    fn test_simple_text_scores_higher() {
        let simple = "The cat sat. The dog ran. We had fun.";
        let dense = "Asynchronous runtime implementations necessitate sophisticated \
                     cooperative scheduling considerations regarding computational fairness.";
        assert!(flesch_reading_ease(simple) > flesch_reading_ease(dense));
        assert!(flesch_reading_ease(simple) <= 100.0);
        assert!(flesch_reading_ease(dense) >= 0.0);
    }

    #[test]
    fn test_code_and_markup_ignored() {
        let with_code = "# Title\n\nThe cat sat.\n\n```rust\nlet extraordinarily_long_identifier = 1;\n```\n";
        assert_eq!(
            flesch_reading_ease(with_code),
            flesch_reading_ease("Title\n\nThe cat sat.")
        );
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(flesch_reading_ease(""), 0.0);
        assert_eq!(flesch_reading_ease("```\ncode\n```"), 0.0);
    }

    #[test]
    fn test_sentences_split_on_lines_and_punctuation() {
        let found = sentences("Intro heading\nFirst one. Second one! Third");
        assert_eq!(found, vec!["Intro heading", "First one.", "Second one!", "Third"]);
    }
}

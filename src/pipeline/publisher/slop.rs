//! Slop Detection
//!
//! Heuristic scan for generic machine-written prose. Three signals, each
//! turned into a capped penalty against a 100-point score:
//!
//! | Signal | Penalty |
//! |--------|---------|
//! | Filler phrases per 1000 words | 5 per phrase-per-1k, max 50 |
//! | Hedging ratio above 2% | 1000 × excess, max 25 |
//! | Sentence-length stddev below 4 words (5+ sentences) | 5 per missing word, max 20 |

use std::sync::LazyLock;

use regex::Regex;

use super::readability::{plain_prose, sentences};
use crate::types::SlopReport;

/// Filler phrases that rarely survive human editing
const TELL_PHRASES: &[&str] = &[
    "delve into",
    "delves into",
    "in today's fast-paced world",
    "in today's digital age",
    "in the ever-evolving",
    "ever-evolving landscape",
    "it's important to note",
    "it is important to note",
    "it's worth noting",
    "it is worth noting",
    "a testament to",
    "navigate the complexities",
    "unlock the power",
    "unlock the potential",
    "harness the power",
    "game-changer",
    "game changer",
    "seamlessly integrate",
    "a rich tapestry",
    "tapestry of",
    "embark on a journey",
    "in conclusion",
    "in summary",
    "at the end of the day",
    "plays a crucial role",
    "plays a pivotal role",
    "a myriad of",
    "robust and scalable",
    "cutting-edge",
    "look no further",
];

const HEDGE_WORDS: &[&str] = &[
    "perhaps",
    "possibly",
    "arguably",
    "somewhat",
    "seemingly",
    "potentially",
    "presumably",
    "might",
    "may",
    "could",
    "likely",
    "generally",
    "typically",
    "relatively",
    "fairly",
];

static TELL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = TELL_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives)).expect("Invalid tell phrase regex")
});

const HEDGING_ALLOWANCE: f32 = 0.02;
const UNIFORMITY_FLOOR: f32 = 4.0;
const UNIFORMITY_MIN_SENTENCES: usize = 5;

const MAX_PHRASE_PENALTY: f32 = 50.0;
const MAX_HEDGING_PENALTY: f32 = 25.0;
const MAX_UNIFORMITY_PENALTY: f32 = 20.0;

/// Scan Markdown content and score it 0..=100 (100 = no slop signals)
pub fn detect_slop(content: &str) -> SlopReport {
    // Curly apostrophes would otherwise dodge the phrase list
    let prose = plain_prose(content).replace('\u{2019}', "'");

    let mut tell_count = 0;
    let mut matched_phrases: Vec<String> = Vec::new();
    for m in TELL_PATTERN.find_iter(&prose) {
        tell_count += 1;
        let phrase = m.as_str().to_lowercase();
        if !matched_phrases.contains(&phrase) {
            matched_phrases.push(phrase);
        }
    }

    let words: Vec<String> = prose
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    let word_total = words.len();

    let hedges = words
        .iter()
        .filter(|w| HEDGE_WORDS.contains(&w.as_str()))
        .count();
    let hedging_ratio = if word_total == 0 {
        0.0
    } else {
        hedges as f32 / word_total as f32
    };

    let lengths: Vec<f32> = sentences(&prose)
        .iter()
        .map(|s| s.split_whitespace().count() as f32)
        .collect();
    let sentence_length_stddev = stddev(&lengths);

    let tells_per_1k = if word_total == 0 {
        0.0
    } else {
        tell_count as f32 * 1000.0 / word_total as f32
    };
    let phrase_penalty = (tells_per_1k * 5.0).min(MAX_PHRASE_PENALTY);

    let hedging_penalty = if hedging_ratio > HEDGING_ALLOWANCE {
        ((hedging_ratio - HEDGING_ALLOWANCE) * 1000.0).min(MAX_HEDGING_PENALTY)
    } else {
        0.0
    };

    let uniformity_penalty = if lengths.len() >= UNIFORMITY_MIN_SENTENCES
        && sentence_length_stddev < UNIFORMITY_FLOOR
    {
        ((UNIFORMITY_FLOOR - sentence_length_stddev) * 5.0).min(MAX_UNIFORMITY_PENALTY)
    } else {
        0.0
    };

    let quality_score =
        (100.0 - phrase_penalty - hedging_penalty - uniformity_penalty).clamp(0.0, 100.0);

    SlopReport {
        tell_count,
        matched_phrases,
        hedging_ratio,
        sentence_length_stddev,
        quality_score,
    }
}

/// Population standard deviation; 0 for fewer than two values
fn stddev(values: &[f32]) -> f32 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

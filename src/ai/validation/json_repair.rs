//! JSON Repair
//!
//! Critique agents are asked for a JSON verdict, but models routinely wrap it
//! in prose or code fences, leave trailing commas, or stop mid-object when
//! they hit the token limit. This module recovers the JSON value when that can
//! be done without guessing at content.

use serde_json::Value;
use tracing::debug;

use crate::types::{DraftError, Result};

/// Extract and parse JSON from a model response
pub fn extract_json_from_response(content: &str) -> Result<Value> {
    JsonRepairer::new().parse_or_repair(content).map(|(value, _)| value)
}

/// Repair strategies applied in order of increasing aggressiveness
pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse JSON, repairing if the first parse fails.
    ///
    /// Returns the value and whether any repair was needed.
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = preprocess(raw);

        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        // Prose around the object is the most common failure, try it first
        if let Some(extracted) = extract_first_value(&cleaned)
            && let Ok(value) = serde_json::from_str::<Value>(extracted)
        {
            debug!("JSON extracted from surrounding text");
            return Ok((value, true));
        }

        let start = cleaned.find(['{', '[']).unwrap_or(0);
        let candidate = &cleaned[start..];

        for level in 1..=self.max_repair_attempts {
            let repaired = repair(candidate, level);
            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                debug!(level, "JSON repaired");
                return Ok((value, true));
            }
        }

        Err(DraftError::pipeline_recoverable(
            "parse",
            format!(
                "unparseable JSON after {} repair attempts: {}...",
                self.max_repair_attempts,
                cleaned.chars().take(200).collect::<String>()
            ),
        ))
    }
}

// =============================================================================
// Repair Steps
// =============================================================================

fn preprocess(raw: &str) -> String {
    let s = raw.trim().trim_start_matches('\u{feff}');
    strip_code_fences(s).trim().to_string()
}

fn strip_code_fences(s: &str) -> &str {
    let mut out = s;
    if out.starts_with("```")
        && let Some(first_newline) = out.find('\n')
    {
        out = &out[first_newline + 1..];
    }
    out.trim_end().strip_suffix("```").unwrap_or(out)
}

fn repair(s: &str, level: usize) -> String {
    let mut out = remove_trailing_commas(s);
    if level >= 2 {
        out = close_strings_at_newline(&out);
    }
    if level >= 3 {
        out = out
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect();
    }
    close_open_structures(&out)
}

/// Tracks string and escape state while walking JSON text
#[derive(Default)]
struct Scanner {
    in_string: bool,
    escape: bool,
}

impl Scanner {
    /// Feed one char; returns true when the char is structural (outside a string)
    fn structural(&mut self, ch: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escape = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ => !self.in_string,
        }
    }
}

fn remove_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut scanner = Scanner::default();

    for (i, &ch) in chars.iter().enumerate() {
        if scanner.structural(ch) && ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(']') | Some('}')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

fn close_strings_at_newline(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut scanner = Scanner::default();

    for ch in s.chars() {
        if scanner.in_string && !scanner.escape && matches!(ch, '\n' | '\r') {
            out.push('"');
            scanner.in_string = false;
        } else {
            scanner.structural(ch);
        }
        out.push(ch);
    }
    out
}

/// Append the closers a truncated document is missing, innermost first
fn close_open_structures(s: &str) -> String {
    let mut stack = Vec::new();
    let mut scanner = Scanner::default();

    for ch in s.chars() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    let mut out = s.trim_end().trim_end_matches(',').to_string();
    if scanner.in_string {
        out.push('"');
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// First balanced `{...}` or `[...]` in the text
fn extract_first_value(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut scanner = Scanner::default();

    for (i, ch) in s[start..].char_indices() {
        if !scanner.structural(ch) {
            continue;
        }
        match ch {
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

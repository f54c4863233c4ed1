//! Text Repair Engine
//!
//! Turns free-form model output that is suspected to contain JSON into a
//! parsed [`CandidateDocument`]. Pure string-to-value transform: it never
//! assumes a target shape, that is the validator's job.
//!
//! Recovery order:
//! 1. direct parse of the input as given;
//! 2. strip fenced code-block markers and stray backticks, parse again;
//! 3. first balanced `{...}` span that parses;
//! 4. first balanced `[...]` span that parses.
//!
//! Every parse attempt falls back to a lenient pass (typographic quotes,
//! trailing commas) before giving up on that candidate. When the first
//! balanced `[...]` span contains the first `{`, step 4 runs before step 3 so
//! the enclosing array is not truncated to its first element.

use crate::error::ParseError;
use serde_json::Value;
use tracing::debug;

/// Untyped document produced by repair; no shape guarantees.
pub type CandidateDocument = Value;

/// Maximum opening positions tried per bracket kind.
const MAX_SPAN_CANDIDATES: usize = 32;

/// Seam for injecting a repair implementation into the pipeline.
pub trait TextRepair: Send + Sync {
    fn repair(&self, text: &str) -> Result<CandidateDocument, ParseError>;
}

/// Default engine implementing the ordered recovery strategies above.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepairEngine;

impl TextRepair for JsonRepairEngine {
    fn repair(&self, text: &str) -> Result<CandidateDocument, ParseError> {
        repair(text)
    }
}

/// Recover a JSON value from `text`.
pub fn repair(text: &str) -> Result<CandidateDocument, ParseError> {
    let original_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let stripped = strip_code_fences(text);
    if let Some(value) = parse_lenient(&stripped) {
        debug!("Recovered document after stripping code fences");
        return Ok(value);
    }

    let array_encloses = match (stripped.find('['), stripped.find('{')) {
        (Some(array), Some(object)) if array < object => {
            balanced_end(&stripped, array, '[', ']').map_or(false, |end| object < end)
        }
        _ => false,
    };
    let order: [(char, char); 2] = if array_encloses {
        [('[', ']'), ('{', '}')]
    } else {
        [('{', '}'), ('[', ']')]
    };

    for (open, close) in order {
        if let Some(value) = first_parsable_span(&stripped, open, close) {
            debug!(open = %open, "Recovered document from balanced span");
            return Ok(value);
        }
    }

    Err(ParseError::new(original_error.to_string()))
}

/// Remove fenced code-block delimiters (with optional language tag) and
/// backticks wrapping the whole payload.
pub fn strip_code_fences(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.lines() {
        let mut body = line.trim();
        if let Some(rest) = body.strip_prefix("```") {
            body = strip_language_tag(rest);
        }
        if let Some(rest) = body.strip_suffix("```") {
            body = rest;
        }
        if body.trim().is_empty() && line.trim_start().starts_with("```") {
            continue;
        }
        kept.push(body);
    }
    kept.join("\n").trim().trim_matches('`').trim().to_string()
}

fn strip_language_tag(rest: &str) -> &str {
    let tag_len: usize = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .map(char::len_utf8)
        .sum();
    let after = &rest[tag_len..];
    let next = after.trim_start().chars().next();
    match next {
        None | Some('{') | Some('[') => after.trim_start(),
        _ => rest,
    }
}

fn first_parsable_span(text: &str, open: char, close: char) -> Option<Value> {
    text.char_indices()
        .filter(|(_, c)| *c == open)
        .take(MAX_SPAN_CANDIDATES)
        .find_map(|(start, _)| {
            let end = balanced_end(text, start, open, close)?;
            parse_lenient(&text[start..=end])
        })
}

/// Byte index of the bracket closing the one at `start`, skipping brackets
/// inside string literals.
pub fn balanced_end(text: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
        } else if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}

fn parse_lenient(candidate: &str) -> Option<Value> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }
    let cleaned = remove_trailing_commas(&normalize_quotes(candidate));
    serde_json::from_str::<Value>(&cleaned).ok()
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Drop commas that directly precede a closing bracket, outside strings.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        if ch == '"' {
            in_string = true;
            out.push(ch);
            continue;
        }
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }
    out
}

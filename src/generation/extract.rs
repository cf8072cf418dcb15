//! Best-effort recovery of a JSON payload from free-form model output.
//!
//! Two stages: [`extract_candidate_json`] locates the payload, then
//! [`parse_structured`] deserializes it, repairing the usual model mistakes
//! (trailing commas, stray backslashes) on a second attempt.

use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in response ({len} chars)")]
    NoJson { len: usize },
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Check if raw output appears to be truncated mid-object
pub fn is_truncated(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }

    if let Some(last_char) = trimmed.chars().last() {
        if matches!(last_char, '{' | '[' | ':' | ',') {
            return true;
        }
    }

    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escape_next = false;
    for ch in trimmed.chars() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => depth -= 1,
            _ => {}
        }
    }

    depth > 0 || in_string
}

/// Byte offset one past the `}` closing the object that opens at `start`.
/// String contents and escapes are skipped; `None` if the object never closes.
fn object_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced `{...}` in `text`
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = object_end(text, start)?;
    Some(&text[start..end])
}

/// Body of the first ``` fenced block, without its language tag.
/// An unclosed fence runs to the end of the text.
fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip a language tag such as `json` up to the end of the line
    let tag_len = after
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(after.len());
    let body = &after[tag_len..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    Some(body.trim())
}

/// Locate the JSON payload inside a model response.
///
/// Tries, in order: the whole text, the first fenced code block, and the
/// first balanced object anywhere in the text.
pub fn extract_candidate_json(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Some(trimmed.to_string());
    }

    if let Some(body) = fenced_body(trimmed) {
        if let Some(object) = first_object(body) {
            tracing::debug!("Extracted JSON from fenced code block");
            return Some(object.to_string());
        }
    }

    let object = first_object(trimmed)?;
    tracing::debug!("Extracted JSON by matching braces");
    Some(object.to_string())
}

/// Remove trailing commas before `}` or `]` outside of string literals
pub fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut result = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escape_next = false;

    for (i, &ch) in chars.iter().enumerate() {
        if in_string {
            result.push(ch);
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        result.push(ch);
    }

    result
}

/// Escape backslashes inside strings that do not start a valid JSON escape
/// (LaTeX such as `\(n\)` is the usual culprit)
pub fn fix_unescaped_backslashes(json: &str) -> String {
    let mut fixed = String::with_capacity(json.len() + 16);
    let mut in_string = false;
    let mut chars = json.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_string => match chars.peek() {
                Some(&next) if matches!(next, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u') => {
                    fixed.push('\\');
                    fixed.push(next);
                    chars.next();
                }
                _ => fixed.push_str("\\\\"),
            },
            '"' => {
                in_string = !in_string;
                fixed.push(ch);
            }
            _ => fixed.push(ch),
        }
    }

    fixed
}

/// Deserialize a candidate payload, retrying once after common repairs
pub fn parse_structured<T: DeserializeOwned>(candidate: &str) -> Result<T, ParseError> {
    match serde_json::from_str::<T>(candidate) {
        Ok(parsed) => Ok(parsed),
        Err(first_error) => {
            let repaired = fix_unescaped_backslashes(&remove_trailing_commas(candidate));
            if repaired != candidate {
                if let Ok(parsed) = serde_json::from_str::<T>(&repaired) {
                    tracing::debug!("Parsed JSON after repairing commas/backslashes");
                    return Ok(parsed);
                }
            }
            Err(ParseError::Malformed(first_error))
        }
    }
}

/// Both stages in one call
pub fn extract_structured<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let candidate = extract_candidate_json(text).ok_or(ParseError::NoJson { len: text.len() })?;
    parse_structured(&candidate)
}

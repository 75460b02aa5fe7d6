//! Recovery of JSON objects from free-form completion text.
//!
//! Models wrap JSON in code fences, add prose around it, and emit raw
//! newlines inside string values. [`parse`] undoes those in order:
//!
//! 1. strip a leading and trailing code fence
//! 2. drop lines that start with a `//` comment
//! 3. cut the text to the span between the first `{` and the last `}`
//! 4. escape raw `\n`, `\r` and `\t` inside string literals
//! 5. parse what is left

use serde_json::Value;
use tracing::debug;

/// Failure to recover JSON from a response.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Nothing left to parse after sanitization
    #[error("Response contained no JSON content")]
    Empty,

    /// Sanitized text is still not valid JSON
    #[error("Invalid JSON in response: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Parse a model response into a JSON value.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let sanitized = sanitize(text);
    if sanitized.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let value = serde_json::from_str(&sanitized)?;
    Ok(value)
}

/// Apply every repair step without parsing.
pub fn sanitize(text: &str) -> String {
    let unfenced = strip_code_fences(text);
    let uncommented = strip_line_comments(unfenced);
    let trimmed = trim_to_braces(&uncommented);
    let repaired = escape_controls_in_strings(trimmed);

    if repaired.len() != text.len() {
        debug!(
            original_len = text.len(),
            sanitized_len = repaired.len(),
            "Sanitized model response"
        );
    }

    repaired
}

fn strip_code_fences(text: &str) -> &str {
    let mut t = text.trim();

    if t.get(..7).is_some_and(|p| p.eq_ignore_ascii_case("```json")) {
        t = &t[7..];
    } else if t.starts_with("```") {
        t = &t[3..];
    }

    t = t.trim();
    if let Some(stripped) = t.strip_suffix("```") {
        t = stripped.trim_end();
    }

    t
}

fn strip_line_comments(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn trim_to_braces(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn escape_controls_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }

    out
}

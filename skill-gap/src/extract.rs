//! JSON extraction from loosely formatted model output.
//!
//! Models are asked for bare JSON but answer with wrappers: a `content='…'`
//! envelope from chat client reprs, markdown code fences, or commentary
//! around the object. Strategies run in order and the first parse wins:
//!
//! 1. strip the `content='…'` envelope and unescape it,
//! 2. direct parse of the trimmed text,
//! 3. strip code fences and parse again,
//! 4. scan for balanced `{…}` spans and try-parse each in order,
//! 5. give up with a typed [`ExtractError`].

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::ExtractError;

/// Extracts the first parseable JSON value from a raw model response.
///
/// # Errors
/// [`ExtractError`] when no strategy yields valid JSON. Never panics.
pub fn extract_json(raw: &str) -> Result<Value, ExtractError> {
    let stripped = strip_content_envelope(raw);
    let trimmed = stripped.trim();

    if trimmed.is_empty() {
        return Err(ExtractError::new("empty response"));
    }

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        trace!("direct parse succeeded");
        return Ok(v);
    }

    let unfenced = strip_code_fences(trimmed);
    if let Ok(v) = serde_json::from_str::<Value>(unfenced.trim()) {
        trace!("parse succeeded after fence strip");
        return Ok(v);
    }

    for span in balanced_object_spans(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(span) {
            debug!(span_len = span.len(), "parse succeeded on embedded object");
            return Ok(v);
        }
    }

    Err(ExtractError::new(format!(
        "tried envelope, direct, fences, and brace scan over {} chars",
        trimmed.chars().count()
    )))
}

/// Strips a `content='…'` chat-repr envelope.
///
/// The payload runs to the first unescaped single quote; `\'`, `\"`, `\n`
/// and `\t` are unescaped along the way. Text without the prefix is returned
/// untouched.
pub fn strip_content_envelope(raw: &str) -> Cow<'_, str> {
    const PREFIX: &str = "content='";

    let trimmed = raw.trim_start();
    let Some(rest) = trimmed.strip_prefix(PREFIX) else {
        return Cow::Borrowed(raw);
    };

    let mut out = String::with_capacity(rest.len());
    let mut chars = rest.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => break,
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Removes a leading ```/```json fence line and a trailing fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        s = rest.trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Yields every balanced top-level `{…}` span in order of appearance.
///
/// A single pass tracks brace depth plus string/escape state so braces inside
/// JSON strings don't break the count. Quote state is only tracked inside a
/// span; apostrophes and stray quotes in surrounding commentary can't poison
/// the scanner.
fn balanced_object_spans(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if depth > 0 {
            if escaped {
                escaped = false;
                continue;
            }
            match b {
                b'\\' if in_string => escaped = true,
                b'"' => in_string = !in_string,
                b'{' if !in_string => depth += 1,
                b'}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            // both ends are ASCII braces, boundaries are valid
                            spans.push(&text[s..=i]);
                        }
                    }
                }
                _ => {}
            }
        } else if b == b'{' {
            start = Some(i);
            depth = 1;
            in_string = false;
            escaped = false;
        }
    }
    spans
}

//! Defensive parsing of structured model replies.
//!
//! Models asked for JSON still occasionally wrap the payload in prose or
//! markdown fences. [`extract_json`] trims that decoration before parsing;
//! if no JSON payload can be recovered the call fails with a parse error
//! rather than being silently swallowed.

use serde_json::Value;

use crate::{HuginnError, Result};

/// Parse a model reply into JSON, stripping surrounding prose if needed.
///
/// Tries the raw (trimmed) reply first, then a fenced ``` block, then the
/// widest substring bounded by the first `{`/`[` and the last `}`/`]`.
pub(crate) fn extract_json(raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(inner) = strip_fence(trimmed)
        && let Ok(value) = serde_json::from_str(inner.trim())
    {
        return Ok(value);
    }

    if let Some(candidate) = widest_json_span(trimmed)
        && let Ok(value) = serde_json::from_str(candidate)
    {
        return Ok(value);
    }

    Err(HuginnError::Parse(format!(
        "no JSON payload in model reply: {}",
        snippet(trimmed)
    )))
}

/// Strip a markdown code fence (```json ... ```), returning the body.
fn strip_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    // drop the info string ("json", "JSON", ...) up to the first newline
    let body = rest.split_once('\n')?.1;
    let end = body.rfind("```")?;
    Some(&body[..end])
}

/// Widest substring that starts at the first JSON opener and ends at the
/// last matching closer.
fn widest_json_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text.as_bytes()[start] == b'{' { '}' } else { ']' };
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn snippet(text: &str) -> String {
    const LIMIT: usize = 120;
    if text.len() <= LIMIT {
        text.to_string()
    } else {
        let mut cut = LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…", &text[..cut])
    }
}

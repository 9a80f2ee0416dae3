//! Output sanitation for generated string lists.
//!
//! Models asked for a list of plain strings routinely decorate entries
//! with numbering, bullets, quotes, or markdown headers, or pack several
//! items into one multi-line entry. [`sanitize_string_list`] normalizes a
//! structurally valid result into clean, independent items; the retry
//! controller treats an empty result after sanitation as a retryable
//! failure, not a success.

use serde_json::Value;

/// Normalize a generated array-of-strings value into clean items.
///
/// Accepts an array value or a string still carrying a JSON-encoded
/// array. Multi-line entries are flattened into independent items;
/// numbering, bullets, and wrapping quotes are stripped; empty and
/// header-like lines are dropped.
pub fn sanitize_string_list(value: &Value) -> Vec<String> {
    let items: Vec<String> = match value {
        Value::Array(entries) => entries
            .iter()
            .map(|entry| match entry {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(inner @ Value::Array(_)) => return sanitize_string_list(&inner),
            _ => vec![raw.clone()],
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .flat_map(|item| item.lines())
        .filter_map(clean_line)
        .collect()
}

fn clean_line(line: &str) -> Option<String> {
    let mut text = line.trim();
    text = strip_bullet(text);
    text = strip_numbering(text);
    text = strip_wrapping_quotes(text).trim();
    if text.is_empty() || is_header_like(text) {
        return None;
    }
    Some(text.to_string())
}

fn strip_bullet(text: &str) -> &str {
    for bullet in ["- ", "* ", "• ", "+ "] {
        if let Some(rest) = text.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }
    text
}

fn strip_numbering(text: &str) -> &str {
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &text[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    text
}

fn strip_wrapping_quotes(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

fn is_header_like(text: &str) -> bool {
    text.starts_with('#')
        || (text.starts_with("**") && text.ends_with("**"))
        || text.ends_with(':')
}

//! JSON-from-free-text extraction for model responses.
//!
//! This is the only place raw model text is parsed. It never panics and never
//! returns a `serde_json::Error`; callers get a tagged `JsonExtraction`.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum JsonExtraction {
    Parsed(Value),
    ParseError(String),
}

/// Strips code fences, then returns the first well-formed JSON object found
/// by brace matching.
pub fn extract_json_object(text: &str) -> JsonExtraction {
    let text = strip_json_fences(text);

    if text.is_empty() {
        return JsonExtraction::ParseError("response was empty".to_string());
    }

    let mut last_error = None;
    for (start, _) in text.match_indices('{') {
        let Some(end) = matching_brace(&text[start..]) else {
            // A stray brace in prose; a later object still closes at its own depth.
            last_error.get_or_insert_with(|| "unbalanced braces".to_string());
            continue;
        };
        let candidate = &text[start..start + end + 1];
        match serde_json::from_str::<Value>(candidate) {
            Ok(value @ Value::Object(_)) => return JsonExtraction::Parsed(value),
            Ok(_) => continue,
            Err(e) => {
                last_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    JsonExtraction::ParseError(
        last_error.unwrap_or_else(|| "no JSON object found in response".to_string()),
    )
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output,
/// including fences preceded by prose.
fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[open + 3..];
    let body = after_open
        .strip_prefix("json")
        .or_else(|| after_open.strip_prefix("JSON"))
        .unwrap_or(after_open);

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Byte offset (relative to `text`) of the brace closing the one at index 0.
/// String literals and escapes are respected.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

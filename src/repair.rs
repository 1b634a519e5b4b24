//! Robust JSON extraction from generation-backend responses.
//!
//! Models wrap JSON in prose, fence it in markdown, or emit almost-JSON
//! (bare keys, single quotes, trailing commas, raw newlines inside
//! strings). [`extract_json`] tries a direct parse, then the substring
//! between the first `{` and the last `}`, then a light repair pass over
//! that substring. Anything still invalid is a
//! [`AppError::MalformedResponse`] naming the original parse failure; a
//! partially recovered value is never returned.

use serde_json::Value;

use crate::errors::{AppError, Result};

/// Extract a JSON value from raw model output.
pub fn extract_json(raw: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(raw) {
        return Ok(value);
    }

    let Some(slice) = brace_slice(raw) else {
        return Err(AppError::MalformedResponse(
            "no JSON object found in response".to_string(),
        ));
    };

    match serde_json::from_str(slice) {
        Ok(value) => Ok(value),
        Err(original) => {
            let repaired = strip_trailing_commas(&normalize_quotes(slice));
            serde_json::from_str(&repaired).map_err(|_| {
                AppError::MalformedResponse(format!("invalid JSON after repair: {original}"))
            })
        }
    }
}

/// The substring between the first `{` and the last `}`, if both exist.
fn brace_slice(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Quote normalization pass: bare object keys get double quotes,
/// single-quoted strings become double-quoted (escaping any inner `"`,
/// unescaping `\'`), and raw newlines inside strings collapse to spaces.
fn normalize_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 16);
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut delim = '"';

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => match chars.next() {
                    Some('\'') if delim == '\'' => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                },
                '"' if delim == '\'' => out.push_str("\\\""),
                '\n' | '\r' => out.push(' '),
                _ if c == delim => {
                    in_string = false;
                    out.push('"');
                }
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = true;
                delim = c;
                out.push('"');
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                ident.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        ident.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if is_bare_key(&ident, chars.clone()) {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// A collected identifier is a bare key when the next meaningful character
/// is a colon and it is not a JSON literal.
fn is_bare_key(ident: &str, ahead: std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    if matches!(ident, "true" | "false" | "null") {
        return false;
    }
    for c in ahead {
        if c.is_whitespace() {
            continue;
        }
        return c == ':';
    }
    false
}

/// Remove commas that directly precede a closing brace or bracket.
fn strip_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in input.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '}' | ']' => {
                let kept = out.trim_end().len();
                if out[..kept].ends_with(',') {
                    let tail = out[kept..].to_string();
                    out.truncate(kept - 1);
                    out.push_str(&tail);
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

//! Decoding with lint fallback
//!
//! The primary decode is `serde_json`. Its `Result` alone decides success, so
//! documents such as `null`, `false`, `0` or `""` are ordinary values here.
//! Only on failure does the linter run, to turn the failure into a
//! line/column diagnostic or to tell an encoding problem apart from a syntax
//! problem.
//!
//! Nesting is capped at [`MAX_DEPTH`] levels, the same bound the encoder
//! enforces, instead of `serde_json`'s built-in limit of 128.

use crate::error::{JsonFileError, JsonSyntaxError, Result};
use crate::lint::{self, MAX_DEPTH};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

/// Decode JSON text
///
/// `source_name` labels the text in error messages (usually a file path).
///
/// # Errors
/// - [`JsonFileError::Syntax`] when the text is malformed
pub fn parse_json(text: &str, source_name: Option<&str>) -> Result<Value> {
    parse_json_bytes(text.as_bytes(), source_name)
}

/// Decode JSON from raw bytes
///
/// # Errors
/// - [`JsonFileError::Syntax`] when the text is malformed
/// - [`JsonFileError::Encoding`] when the text is well-formed but not UTF-8
pub fn parse_json_bytes(bytes: &[u8], source_name: Option<&str>) -> Result<Value> {
    if nesting_depth(bytes) > MAX_DEPTH {
        let too_deep = <serde_json::Error as serde::de::Error>::custom(format!(
            "nesting deeper than {MAX_DEPTH} levels"
        ));
        return Err(diagnose(bytes, source_name, &too_deep));
    }

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    // depth is bounded above
    deserializer.disable_recursion_limit();
    Value::deserialize(&mut deserializer)
        .and_then(|value| deserializer.end().map(|()| value))
        .map_err(|decode_error| diagnose(bytes, source_name, &decode_error))
}

/// Deepest array/object nesting in `bytes`, ignoring brackets inside strings
///
/// Unbalanced input is fine; the decoder reports it.
fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Explain a failed decode
fn diagnose(bytes: &[u8], source_name: Option<&str>, decode_error: &serde_json::Error) -> JsonFileError {
    let (text, utf8) = match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), true),
        Err(_) => (String::from_utf8_lossy(bytes), false),
    };

    match lint::lint(&text) {
        Err(lint_error) => {
            tracing::debug!(
                "JSON lint failed for {}: line {}",
                source_name.unwrap_or("input"),
                lint_error.details.line
            );
            JsonSyntaxError::from_lint(source_name, lint_error).into()
        }
        Ok(()) if !utf8 => JsonFileError::encoding(source_name),
        // Well-formed and UTF-8 but still rejected (number out of range,
        // nesting past the decoder's limit): keep the decoder's own location.
        Ok(()) => JsonSyntaxError::from_decoder(source_name, decode_error).into(),
    }
}

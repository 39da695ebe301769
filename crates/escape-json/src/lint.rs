//! Strict JSON checker for human-readable diagnostics
//!
//! `serde_json` stops at the first problem with a terse message. Manifests are
//! edited by hand, so after a failed decode the text is walked again by this
//! linter, which reports the line, an excerpt with a caret under the problem,
//! the tokens that would have been accepted, and a hint for the usual
//! hand-editing mistakes (single quotes, trailing commas, comments, stray
//! backslashes).
//!
//! The linter never builds a value; it only answers "where is it broken".

use std::collections::HashSet;

/// Tokens that may start a value
const VALUE_TOKENS: &[&str] = &["STRING", "NUMBER", "NULL", "TRUE", "FALSE", "{", "["];

/// Characters of context shown on each side of the caret
const EXCERPT_RADIUS: usize = 20;

/// Deepest array/object nesting accepted by the decoder, the encoder and
/// the linter
pub const MAX_DEPTH: usize = 512;

/// Structured location of a lint failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDetails {
    /// Offending token text (`EOF` at end of input)
    pub token: String,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
    /// Tokens accepted at this position
    pub expected: Vec<String>,
}

/// First syntax problem found in a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LintError {
    /// Multi-line diagnostic
    pub message: String,
    /// Location and expectation
    pub details: LintDetails,
}

/// Linter switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Report a key that appears twice in the same object
    pub detect_duplicate_keys: bool,
}

/// Check `text` for syntax errors with default options
///
/// # Errors
/// Returns the first problem found.
pub fn lint(text: &str) -> Result<(), LintError> {
    lint_with(text, LintOptions::default())
}

/// Check `text` for syntax errors
///
/// # Errors
/// Returns the first problem found.
pub fn lint_with(text: &str, options: LintOptions) -> Result<(), LintError> {
    Linter::new(text, options).run()
}

/// Snapshot of a position, for errors reported behind the cursor
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    line_start: usize,
}

struct Linter<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
    depth: usize,
    options: LintOptions,
}

type Step = Result<(), LintError>;

impl<'a> Linter<'a> {
    fn new(text: &'a str, options: LintOptions) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            depth: 0,
            options,
        }
    }

    fn run(mut self) -> Step {
        if self.text.starts_with('\u{feff}') {
            return Err(self.fail(
                self.mark(),
                VALUE_TOKENS,
                Some("BOM detected, make sure your input does not include a Unicode Byte-Order-Mark"),
            ));
        }
        self.skip_ws();
        self.value()?;
        self.skip_ws();
        if self.peek().is_some() {
            let hint = self.generic_hint();
            return Err(self.fail(self.mark(), &["EOF"], hint));
        }
        Ok(())
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            line_start: self.line_start,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b'\n' => {
                    self.bump();
                    self.line += 1;
                    self.line_start = self.pos;
                }
                b' ' | b'\t' | b'\r' => self.bump(),
                _ => break,
            }
        }
    }

    fn generic_hint(&self) -> Option<&'static str> {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'\''), _) => {
                Some("Invalid string, it appears you used single quotes instead of double quotes")
            }
            (Some(b'/'), Some(b'/' | b'*')) => Some("Comments are not allowed in JSON"),
            _ => None,
        }
    }

    fn value(&mut self) -> Step {
        match self.peek() {
            Some(b'{') => self.nested(Self::object),
            Some(b'[') => self.nested(Self::array),
            Some(b'"') => self.string().map(|_| ()),
            Some(b'-' | b'0'..=b'9') => self.number(),
            Some(b't') => self.literal("true"),
            Some(b'f') => self.literal("false"),
            Some(b'n') => self.literal("null"),
            _ => {
                let hint = self.generic_hint();
                Err(self.fail(self.mark(), VALUE_TOKENS, hint))
            }
        }
    }

    fn nested(&mut self, body: fn(&mut Self) -> Step) -> Step {
        if self.depth >= MAX_DEPTH {
            return Err(self.fail(self.mark(), VALUE_TOKENS, Some("Maximum nesting depth exceeded")));
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }

    fn object(&mut self) -> Step {
        self.bump();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.bump();
            return Ok(());
        }

        let mut seen: HashSet<&'a str> = HashSet::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b'"') => {}
                Some(b'}') => {
                    return Err(self.fail(
                        self.mark(),
                        &["STRING"],
                        Some("It appears you have an extra trailing comma"),
                    ));
                }
                Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                    return Err(self.fail(
                        self.mark(),
                        &["STRING", "}"],
                        Some("Invalid string, it appears you forgot to quote a key"),
                    ));
                }
                _ => {
                    let hint = self.generic_hint();
                    return Err(self.fail(self.mark(), &["STRING", "}"], hint));
                }
            }

            let key_mark = self.mark();
            let key = self.string()?;
            if self.options.detect_duplicate_keys && !seen.insert(key) {
                return Err(self.duplicate(key_mark, key));
            }

            self.skip_ws();
            if self.peek() != Some(b':') {
                let hint = self.generic_hint();
                return Err(self.fail(self.mark(), &[":"], hint));
            }
            self.bump();
            self.skip_ws();
            self.value()?;
            self.skip_ws();

            match self.peek() {
                Some(b',') => self.bump(),
                Some(b'}') => {
                    self.bump();
                    return Ok(());
                }
                _ => {
                    let hint = self.generic_hint();
                    return Err(self.fail(self.mark(), &[",", "}"], hint));
                }
            }
        }
    }

    fn array(&mut self) -> Step {
        self.bump();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.bump();
            return Ok(());
        }

        loop {
            self.skip_ws();
            if self.peek() == Some(b']') {
                return Err(self.fail(
                    self.mark(),
                    VALUE_TOKENS,
                    Some("It appears you have an extra trailing comma"),
                ));
            }
            self.value()?;
            self.skip_ws();

            match self.peek() {
                Some(b',') => self.bump(),
                Some(b']') => {
                    self.bump();
                    return Ok(());
                }
                _ => {
                    let hint = self.generic_hint();
                    return Err(self.fail(self.mark(), &[",", "]"], hint));
                }
            }
        }
    }

    /// Consume a string and return its raw contents (escapes undecoded)
    fn string(&mut self) -> Result<&'a str, LintError> {
        self.bump();
        let start = self.pos;
        loop {
            match self.peek() {
                None => {
                    return Err(self.fail(self.mark(), &["\""], Some("Unterminated string")));
                }
                Some(b'"') => {
                    let text = self.text;
                    let raw = &text[start..self.pos];
                    self.bump();
                    return Ok(raw);
                }
                Some(b'\\') => self.escape()?,
                Some(b'\n') => {
                    return Err(self.fail(
                        self.mark(),
                        &["\""],
                        Some("Invalid string, it appears you forgot to terminate a string, or attempted to write a multiline string which is invalid"),
                    ));
                }
                Some(b) if b < 0x20 => {
                    return Err(self.fail(
                        self.mark(),
                        &["\""],
                        Some("Invalid string, control characters must be escaped"),
                    ));
                }
                // continuation bytes are >= 0x80, so stepping bytewise never
                // lands on a quote or backslash inside a multi-byte char
                Some(_) => self.bump(),
            }
        }
    }

    fn escape(&mut self) -> Step {
        let at = self.mark();
        match self.peek_at(1) {
            Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                self.pos += 2;
                Ok(())
            }
            Some(b'u') => {
                let hex = (2..6).all(|i| self.peek_at(i).is_some_and(|b| b.is_ascii_hexdigit()));
                if !hex {
                    return Err(self.fail(
                        at,
                        &["\""],
                        Some("Invalid string, \\u must be followed by four hexadecimal digits"),
                    ));
                }
                self.pos += 6;
                Ok(())
            }
            _ => {
                let shown = self.text[at.pos..]
                    .chars()
                    .take(2)
                    .collect::<String>();
                let hint = format!("Invalid string, it appears you have an unescaped backslash at: {shown}");
                Err(self.fail_owned(at, &["\""], Some(hint)))
            }
        }
    }

    fn number(&mut self) -> Step {
        if self.peek() == Some(b'-') {
            self.bump();
        }
        match self.peek() {
            Some(b'0') => self.bump(),
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.fail(self.mark(), &["NUMBER"], None)),
        }
        if self.peek() == Some(b'.') {
            self.bump();
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.fail(self.mark(), &["NUMBER"], None));
            }
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.bump();
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.bump();
            }
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.fail(self.mark(), &["NUMBER"], None));
            }
            self.digits();
        }
        Ok(())
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
    }

    fn literal(&mut self, word: &str) -> Step {
        let rest = &self.bytes[self.pos..];
        let terminated = rest
            .get(word.len())
            .map_or(true, |b| !b.is_ascii_alphanumeric());
        if rest.starts_with(word.as_bytes()) && terminated {
            self.pos += word.len();
            return Ok(());
        }
        Err(self.fail(self.mark(), VALUE_TOKENS, None))
    }

    fn duplicate(&self, at: Mark, key: &str) -> LintError {
        let (line_text, caret) = self.excerpt(at);
        LintError {
            message: format!(
                "Parse error on line {}:\n{line_text}\n{caret}\nDuplicate key: \"{key}\"",
                at.line
            ),
            details: LintDetails {
                token: key.to_string(),
                line: at.line,
                column: self.column(at),
                expected: Vec::new(),
            },
        }
    }

    fn fail(&self, at: Mark, expected: &[&str], hint: Option<&str>) -> LintError {
        self.fail_owned(at, expected, hint.map(str::to_string))
    }

    fn fail_owned(&self, at: Mark, expected: &[&str], hint: Option<String>) -> LintError {
        let (line_text, caret) = self.excerpt(at);
        let expectation = match expected {
            [only] => format!("Expected '{only}'"),
            many => format!(
                "Expected one of: {}",
                many.iter()
                    .map(|t| format!("'{t}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        };
        let mut message = format!(
            "Parse error on line {}:\n{line_text}\n{caret}\n{expectation}",
            at.line
        );
        if let Some(hint) = hint {
            message.push('\n');
            message.push_str(&hint);
        }

        LintError {
            message,
            details: LintDetails {
                token: self.token_at(at),
                line: at.line,
                column: self.column(at),
                expected: expected.iter().map(|t| (*t).to_string()).collect(),
            },
        }
    }

    fn column(&self, at: Mark) -> usize {
        self.text
            .get(at.line_start..at.pos)
            .map_or(0, |s| s.chars().count())
            + 1
    }

    fn token_at(&self, at: Mark) -> String {
        let Some(rest) = self.text.get(at.pos..) else {
            return "EOF".to_string();
        };
        let mut chars = rest.chars();
        match chars.next() {
            None => "EOF".to_string(),
            Some(c) if c.is_alphanumeric() => rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect(),
            Some(c) => c.to_string(),
        }
    }

    /// Current line around `at`, plus a caret line pointing at it
    fn excerpt(&self, at: Mark) -> (String, String) {
        let line_end = self.text[at.line_start..]
            .find('\n')
            .map_or(self.text.len(), |i| at.line_start + i);
        let line = self.text[at.line_start..line_end].trim_end_matches('\r');
        let split = at.pos.clamp(at.line_start, at.line_start + line.len()) - at.line_start;
        let (before, after) = line.split_at(split);

        let before_chars: Vec<char> = before.chars().collect();
        let mut shown = String::new();
        if before_chars.len() > EXCERPT_RADIUS {
            shown.push_str("...");
            shown.extend(&before_chars[before_chars.len() - EXCERPT_RADIUS..]);
        } else {
            shown.extend(&before_chars);
        }
        let lead = shown.chars().count();
        shown.extend(after.chars().take(EXCERPT_RADIUS));

        (shown, format!("{}^", "-".repeat(lead)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lint_err(text: &str) -> LintError {
        lint(text).expect_err("lint should fail")
    }

    #[test]
    fn accepts_valid_documents() {
        for text in [
            "null",
            "false",
            "0",
            "-1.5e+10",
            "\"\"",
            "[]",
            "{}",
            "  {\"a\": [1, 2, {\"b\": null}], \"c\": \"\\u00e9\\n\"}\n",
            "\"caf\u{e9} \u{1f600}\"",
        ] {
            assert!(lint(text).is_ok(), "expected valid: {text}");
        }
    }

    #[test]
    fn empty_input_expects_a_value() {
        let err = lint_err("");
        assert_eq!(err.details.line, 1);
        assert_eq!(err.details.token, "EOF");
        assert_eq!(err.details.expected.len(), VALUE_TOKENS.len());
        assert!(err.message.starts_with("Parse error on line 1:"));
    }

    #[test]
    fn trailing_comma_in_object() {
        let err = lint_err("{\n    \"name\": \"a/b\",\n}");
        assert_eq!(err.details.line, 3);
        assert_eq!(err.details.column, 1);
        assert!(err.message.contains("extra trailing comma"));
    }

    #[test]
    fn trailing_comma_in_array() {
        let err = lint_err("[1, 2,]");
        assert_eq!(err.details.column, 7);
        assert!(err.message.contains("extra trailing comma"));
    }

    #[test]
    fn single_quotes_hint() {
        let err = lint_err("{\n  'name': 1\n}");
        assert_eq!(err.details.line, 2);
        assert_eq!(err.details.column, 3);
        assert_eq!(err.details.token, "'");
        assert!(err.message.contains("single quotes"));
    }

    #[test]
    fn unquoted_key_hint() {
        let err = lint_err("{name: 1}");
        assert_eq!(err.details.token, "name");
        assert!(err.message.contains("forgot to quote a key"));
    }

    #[test]
    fn comments_hint() {
        let err = lint_err("{\n// note\n\"a\": 1}");
        assert_eq!(err.details.line, 2);
        assert!(err.message.contains("Comments are not allowed"));
    }

    #[test]
    fn bad_escape_hint() {
        let err = lint_err(r#"{"path": "C:\windows"}"#);
        assert!(err.message.contains("unescaped backslash at: \\w"));
        assert_eq!(err.details.column, 13);
    }

    #[test]
    fn short_unicode_escape() {
        let err = lint_err(r#""\u12""#);
        assert!(err.message.contains("four hexadecimal digits"));
    }

    #[test]
    fn multiline_string() {
        let err = lint_err("\"abc\ndef\"");
        assert_eq!(err.details.line, 1);
        assert!(err.message.contains("multiline string"));
    }

    #[test]
    fn missing_colon() {
        let err = lint_err("{\"a\" 1}");
        assert_eq!(err.details.expected, vec![":".to_string()]);
        assert_eq!(err.details.token, "1");
    }

    #[test]
    fn bad_literal() {
        let err = lint_err("[nul]");
        assert_eq!(err.details.token, "nul");
        let err = lint_err("[True]");
        assert_eq!(err.details.token, "True");
    }

    #[test]
    fn bad_numbers() {
        assert!(lint("-").is_err());
        assert!(lint("1.").is_err());
        assert!(lint("1e").is_err());
        assert!(lint("01").is_err());
        assert!(lint("1e-3").is_ok());
    }

    #[test]
    fn trailing_garbage() {
        let err = lint_err("{} x");
        assert_eq!(err.details.expected, vec!["EOF".to_string()]);
        assert_eq!(err.details.column, 4);
    }

    #[test]
    fn byte_order_mark() {
        let err = lint_err("\u{feff}{}");
        assert!(err.message.contains("BOM detected"));
    }

    #[test]
    fn caret_points_at_problem() {
        let err = lint_err("[1 2]");
        let lines: Vec<&str> = err.message.lines().collect();
        assert_eq!(lines[1], "[1 2]");
        assert_eq!(lines[2], "---^");
    }

    #[test]
    fn long_lines_are_elided() {
        let text = format!("[\"{}\" 1]", "x".repeat(60));
        let err = lint_err(&text);
        let lines: Vec<&str> = err.message.lines().collect();
        assert!(lines[1].starts_with("..."));
        assert_eq!(lines[2].len(), 3 + EXCERPT_RADIUS + 1);
    }

    #[test]
    fn columns_count_characters() {
        let err = lint_err("[\"\u{e9}\u{e9}\" x]");
        assert_eq!(err.details.column, 7);
    }

    #[test]
    fn duplicate_keys_opt_in() {
        let text = "{\"a\": 1, \"a\": 2}";
        assert!(lint(text).is_ok());

        let options = LintOptions {
            detect_duplicate_keys: true,
        };
        let err = lint_with(text, options).expect_err("duplicate");
        assert!(err.message.contains("Duplicate key: \"a\""));
        assert_eq!(err.details.column, 10);
    }

    #[test]
    fn deep_nesting_is_bounded() {
        let text = "[".repeat(MAX_DEPTH + 10);
        let err = lint_err(&text);
        assert!(err.message.contains("Maximum nesting depth"));
    }
}

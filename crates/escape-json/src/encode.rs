//! JSON encoding with manifest-style formatting
//!
//! Pretty output indents with four spaces and separates keys with `": "`.
//! Empty arrays and objects always render as `[]` / `{}`, whatever the
//! indentation setting.

use crate::error::{JsonFileError, Result};
use crate::lint::MAX_DEPTH;
use crate::options::EncodeOptions;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};

const INDENT: &[u8] = b"    ";

/// Serialize `value` honoring `options`
///
/// # Errors
/// Returns [`JsonFileError::Encode`] if `value` cannot be represented as JSON
/// (for example a map with non-string keys) or nests deeper than
/// [`MAX_DEPTH`] levels.
pub fn encode<T>(value: &T, options: EncodeOptions) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let mut buf = Vec::with_capacity(256);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, ManifestFormatter::new(options));
    value
        .serialize(&mut serializer)
        .map_err(JsonFileError::Encode)?;

    String::from_utf8(buf)
        .map_err(|e| JsonFileError::Encode(<serde_json::Error as serde::ser::Error>::custom(e)))
}

/// `serde_json` formatter driven by [`EncodeOptions`]
#[derive(Debug, Clone)]
pub struct ManifestFormatter {
    options: EncodeOptions,
    depth: usize,
    has_value: bool,
}

impl ManifestFormatter {
    /// Create formatter for the given options
    #[inline]
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Self {
            options,
            depth: 0,
            has_value: false,
        }
    }

    fn newline_indent<W: ?Sized + Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b"\n")?;
        for _ in 0..self.depth {
            writer.write_all(INDENT)?;
        }
        Ok(())
    }

    fn open<W: ?Sized + Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + Write>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()> {
        self.depth -= 1;
        if self.options.pretty_print && self.has_value {
            self.newline_indent(writer)?;
        }
        writer.write_all(bracket)
    }

    fn separate<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        if self.options.pretty_print {
            self.newline_indent(writer)?;
        }
        Ok(())
    }
}

impl Formatter for ManifestFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.separate(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        if self.options.pretty_print {
            writer.write_all(b": ")
        } else {
            writer.write_all(b":")
        }
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let EncodeOptions {
            unescaped_slashes,
            unescaped_unicode,
            ..
        } = self.options;
        if unescaped_slashes && unescaped_unicode {
            return writer.write_all(fragment.as_bytes());
        }

        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            let slash = ch == '/' && !unescaped_slashes;
            let wide = !ch.is_ascii() && !unescaped_unicode;
            if !slash && !wide {
                continue;
            }

            writer.write_all(fragment[start..i].as_bytes())?;
            if slash {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

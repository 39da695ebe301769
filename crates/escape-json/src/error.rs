//! Error types for JSON file operations
//!
//! Covers the full lifecycle of a manifest:
//! - Read (I/O, syntax, encoding)
//! - Validate (schema violations)
//! - Write (directory creation, encoding, retried I/O)

use crate::lint::{LintDetails, LintError};
use std::io;
use std::path::{Path, PathBuf};

/// Malformed JSON, with the location the linter pinned it to
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} does not contain valid JSON\n{message}", describe_source(.source_name.as_deref()))]
pub struct JsonSyntaxError {
    /// File name or other label of the text, if known
    pub source_name: Option<String>,
    /// Human-readable diagnostic, usually several lines long
    pub message: String,
    /// Structured location of the problem
    pub details: LintDetails,
}

impl JsonSyntaxError {
    /// Build from a lint failure
    #[must_use]
    pub fn from_lint(source_name: Option<&str>, lint: LintError) -> Self {
        Self {
            source_name: source_name.map(str::to_string),
            message: lint.message,
            details: lint.details,
        }
    }

    /// Build from a decoder failure the linter could not reproduce
    #[must_use]
    pub fn from_decoder(source_name: Option<&str>, error: &serde_json::Error) -> Self {
        Self {
            source_name: source_name.map(str::to_string),
            message: format!("Parse error on line {}:\n{error}", error.line()),
            details: LintDetails {
                token: String::new(),
                line: error.line(),
                column: error.column(),
                expected: Vec::new(),
            },
        }
    }

    /// 1-based line of the problem
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.details.line
    }

    /// 1-based column of the problem
    #[inline]
    #[must_use]
    pub fn column(&self) -> usize {
        self.details.column
    }
}

/// Why the parent directory of a write target is unusable
#[derive(Debug, thiserror::Error)]
pub enum DirectoryFault {
    /// Something other than a directory sits at the path
    #[error("exists and is not a directory.")]
    NotADirectory,

    /// `create_dir_all` failed
    #[error("does not exist and could not be created.")]
    Uncreatable(#[source] io::Error),
}

/// Errors from [`JsonFile`](crate::JsonFile) and the free functions of this crate
#[derive(Debug, thiserror::Error)]
pub enum JsonFileError {
    /// File could not be read
    #[error("could not read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Text is not valid JSON
    #[error(transparent)]
    Syntax(#[from] JsonSyntaxError),

    /// Text is well-formed JSON but the bytes are not UTF-8
    #[error("{} is not UTF-8, could not parse as JSON", describe_source(.source_name.as_deref()))]
    Encoding { source_name: Option<String> },

    /// Document does not satisfy the schema
    #[error("\"{path}\" does not match the expected JSON schema")]
    Validation { path: PathBuf, errors: Vec<String> },

    /// The bundled schema could not be loaded or compiled
    #[error("bundled JSON schema is unusable: {0}")]
    Schema(String),

    /// Parent directory of a write target is unusable
    #[error("{dir} {fault}")]
    DirectoryCreate {
        dir: PathBuf,
        #[source]
        fault: DirectoryFault,
    },

    /// Every write attempt failed; carries the last I/O error
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Value could not be serialized
    #[error("could not encode JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

impl JsonFileError {
    /// Create read error for path
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create encoding error for an optional source label
    pub fn encoding(source_name: Option<&str>) -> Self {
        Self::Encoding {
            source_name: source_name.map(str::to_string),
        }
    }

    /// Create directory error
    pub fn directory(dir: impl Into<PathBuf>, fault: DirectoryFault) -> Self {
        Self::DirectoryCreate {
            dir: dir.into(),
            fault,
        }
    }

    /// Create write error for path
    pub fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Schema violation lines, empty for every other variant
    #[must_use]
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn describe_source(source_name: Option<&str>) -> String {
    source_name.map_or_else(|| "input".to_string(), |name| format!("\"{name}\""))
}

/// Result type alias for JSON file operations
pub type Result<T> = std::result::Result<T, JsonFileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_error_names_source() {
        let err = JsonFileError::encoding(Some("composer.json"));
        assert_eq!(
            err.to_string(),
            "\"composer.json\" is not UTF-8, could not parse as JSON"
        );
    }

    #[test]
    fn syntax_error_without_source() {
        let err = JsonSyntaxError {
            source_name: None,
            message: "Parse error on line 1:".to_string(),
            details: LintDetails {
                token: "EOF".to_string(),
                line: 1,
                column: 1,
                expected: vec![],
            },
        };
        assert_eq!(
            err.to_string(),
            "input does not contain valid JSON\nParse error on line 1:"
        );
    }

    #[test]
    fn directory_error_display() {
        let err = JsonFileError::directory("/tmp/blocked", DirectoryFault::NotADirectory);
        assert_eq!(err.to_string(), "/tmp/blocked exists and is not a directory.");
    }

    #[test]
    fn violations_only_for_validation() {
        let err = JsonFileError::Validation {
            path: PathBuf::from("composer.json"),
            errors: vec!["\"name\" is a required property".to_string()],
        };
        assert_eq!(err.violations().len(), 1);
        assert!(JsonFileError::Schema("x".into()).violations().is_empty());
    }
}

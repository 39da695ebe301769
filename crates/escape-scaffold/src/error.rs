//! Error types for scaffolding

use escape_json::JsonFileError;
use std::path::PathBuf;

/// Errors while cloning or bootstrapping a project
#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    /// Target directory is already there
    #[error("target already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Project or repository name unsafe to hand to a shell
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Command could not be started at all
    #[error("could not run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Command ran and exited non-zero
    #[error("step '{step}' failed with exit code {code}")]
    StepFailed { step: String, code: i32 },

    /// A project manifest is unreadable or fails the schema
    #[error("manifest check failed: {0}")]
    Manifest(#[source] JsonFileError),

    /// Configuration file decodes but has the wrong shape
    #[error("invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScaffoldError {
    /// Create invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Exit code of the failed step, if a step failed
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::StepFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<JsonFileError> for ScaffoldError {
    fn from(err: JsonFileError) -> Self {
        Self::Manifest(err)
    }
}

/// Result type alias for scaffolding operations
pub type Result<T> = std::result::Result<T, ScaffoldError>;

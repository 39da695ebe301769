//! Project identity: boilerplate kind, names, target directories

use crate::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Starter repository for a new application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boilerplate {
    /// Laravel application skeleton
    #[default]
    Laravel,
    /// Static HTML skeleton
    Html,
}

impl Display for Boilerplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Laravel => "laravel",
            Self::Html => "html",
        })
    }
}

impl FromStr for Boilerplate {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "laravel" => Ok(Self::Laravel),
            "html" => Ok(Self::Html),
            _ => Err(ScaffoldError::invalid_name(s, "expected 'laravel' or 'html'")),
        }
    }
}

/// Check that `name` is usable both as a directory and inside a shell command
///
/// Accepts ASCII letters, digits, `-`, `_` and `.`, not starting with `-` or `.`.
///
/// # Errors
/// Returns [`ScaffoldError::InvalidName`] otherwise.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ScaffoldError::invalid_name(name, "name is empty"));
    }
    if name.starts_with(['-', '.']) {
        return Err(ScaffoldError::invalid_name(name, "name must not start with '-' or '.'"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(ScaffoldError::invalid_name(
            name,
            "only letters, digits, '-', '_' and '.' are allowed",
        ));
    }
    Ok(())
}

/// Fail if a directory already sits at `dir`
///
/// # Errors
/// Returns [`ScaffoldError::AlreadyExists`].
pub fn verify_target_absent(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        tracing::error!("Application already exists: {}", dir.display());
        return Err(ScaffoldError::AlreadyExists(dir.to_path_buf()));
    }
    Ok(())
}

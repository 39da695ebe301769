//! [`JsonFile`]: a JSON document identified by its path

use crate::encode::encode;
use crate::error::{DirectoryFault, JsonFileError, Result};
use crate::options::{EncodeOptions, SchemaMode};
use crate::parse::parse_json_bytes;
use crate::schema;
use crate::sink::{write_retrying, AtomicFileSink, ContentSink, RetryPolicy};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads, validates and writes one JSON file
///
/// Holds nothing but the path; every operation goes back to disk.
///
/// # Example
///
/// ```rust,ignore
/// use escape_json::{EncodeOptions, JsonFile, SchemaMode};
///
/// let file = JsonFile::new("composer.json");
/// file.validate_schema(SchemaMode::Lax)?;
/// let mut manifest = file.read()?;
/// manifest["minimum-stability"] = "dev".into();
/// file.write(&manifest, EncodeOptions::default())?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Associate with a path. The file need not exist.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a regular file exists at the path
    #[inline]
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and decode the file
    ///
    /// # Errors
    /// - [`JsonFileError::FileRead`] if the file cannot be read
    /// - [`JsonFileError::Syntax`] / [`JsonFileError::Encoding`] if it does not decode
    pub fn read(&self) -> Result<Value> {
        let bytes = self.read_bytes()?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        parse_json_bytes(&bytes, Some(&self.label()))
    }

    /// Check the file against the bundled manifest schema
    ///
    /// # Errors
    /// - any error of [`read`](Self::read)
    /// - [`JsonFileError::Validation`] listing every violation
    /// - [`JsonFileError::Schema`] if the bundled schema is unusable
    pub fn validate_schema(&self, mode: SchemaMode) -> Result<()> {
        let data = parse_json_bytes(&self.read_bytes()?, Some(&self.label()))?;
        let schema = schema::manifest_schema(mode)?;

        let errors = schema::violations(&data, &schema)?;
        if errors.is_empty() {
            tracing::debug!("{} matches the manifest schema ({:?})", self.path.display(), mode);
            return Ok(());
        }

        tracing::debug!(
            "{} has {} schema violation(s) ({:?})",
            self.path.display(),
            errors.len(),
            mode
        );
        Err(JsonFileError::Validation {
            path: self.path.clone(),
            errors,
        })
    }

    /// Encode `value` and write it, creating the parent directory if needed
    ///
    /// Pretty-printed output ends with a newline. Failed writes are retried
    /// per [`RetryPolicy::default`].
    ///
    /// # Errors
    /// - [`JsonFileError::DirectoryCreate`] if the parent directory is unusable
    /// - [`JsonFileError::Encode`] if `value` is not representable
    /// - [`JsonFileError::Write`] once every attempt has failed
    pub fn write<T>(&self, value: &T, options: EncodeOptions) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.write_with(value, options, &mut AtomicFileSink, RetryPolicy::default())
    }

    /// [`write`](Self::write) with an explicit sink and retry policy
    ///
    /// # Errors
    /// Same as [`write`](Self::write).
    pub fn write_with<T, S>(
        &self,
        value: &T,
        options: EncodeOptions,
        sink: &mut S,
        policy: RetryPolicy,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
        S: ContentSink + ?Sized,
    {
        self.ensure_parent_dir()?;

        let mut contents = encode(value, options)?;
        if options.pretty_print {
            contents.push('\n');
        }

        write_retrying(sink, &self.path, contents.as_bytes(), policy)?;
        tracing::debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| JsonFileError::file_read(&self.path, source))
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return Ok(());
        };
        if dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(JsonFileError::directory(dir, DirectoryFault::NotADirectory));
        }

        fs::create_dir_all(dir)
            .map_err(|e| JsonFileError::directory(dir, DirectoryFault::Uncreatable(e)))?;
        tracing::debug!("Created directory {}", dir.display());
        Ok(())
    }
}

impl From<PathBuf> for JsonFile {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for JsonFile {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl AsRef<Path> for JsonFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

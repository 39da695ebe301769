//! Escape JSON
//!
//! Reading, linting, validating and writing of hand-edited JSON manifests
//! (`composer.json` and friends).
//!
//! # Core Operations
//!
//! - **Read**: decode a file, with line/column diagnostics on failure
//! - **Validate**: check a file against the bundled manifest schema
//! - **Encode**: format values with independent slash/unicode/indent switches
//! - **Write**: create the parent directory, encode, write with bounded retry
//!
//! # Example
//!
//! ```rust,ignore
//! use escape_json::{EncodeOptions, JsonFile, SchemaMode};
//!
//! let file = JsonFile::new("composer.json");
//! if file.exists() {
//!     file.validate_schema(SchemaMode::Strict)?;
//!     let manifest = file.read()?;
//!     println!("{}", escape_json::encode(&manifest, EncodeOptions::default())?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod encode;
pub mod error;
pub mod file;
pub mod lint;
pub mod options;
pub mod parse;
pub mod schema;
pub mod sink;

pub use encode::{encode, ManifestFormatter};
pub use error::{DirectoryFault, JsonFileError, JsonSyntaxError, Result};
pub use file::JsonFile;
pub use lint::{lint, lint_with, LintDetails, LintError, LintOptions, MAX_DEPTH};
pub use options::{
    EncodeOptions, SchemaMode, DEFAULT_OPTIONS, LAX_SCHEMA, PRETTY_PRINT, STRICT_SCHEMA,
    UNESCAPED_SLASHES, UNESCAPED_UNICODE,
};
pub use parse::{parse_json, parse_json_bytes};
pub use sink::{AtomicFileSink, ContentSink, RetryPolicy};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with JSON manifests
    pub use crate::error::{JsonFileError, JsonSyntaxError};
    pub use crate::file::JsonFile;
    pub use crate::options::{EncodeOptions, SchemaMode};
    pub use crate::sink::{ContentSink, RetryPolicy};
    pub use crate::{encode, parse_json};
}

//! Encoding options and schema modes
//!
//! Both types carry a legacy integer encoding so that flag values stored by
//! older tooling (`448`, `1`, `2`) keep their meaning.

use serde::{Deserialize, Serialize};

/// Legacy bit: leave `/` unescaped
pub const UNESCAPED_SLASHES: u32 = 64;

/// Legacy bit: indent output for humans
pub const PRETTY_PRINT: u32 = 128;

/// Legacy bit: emit non-ASCII characters as-is
pub const UNESCAPED_UNICODE: u32 = 256;

/// Legacy default (`UNESCAPED_SLASHES | PRETTY_PRINT | UNESCAPED_UNICODE`)
pub const DEFAULT_OPTIONS: u32 = UNESCAPED_SLASHES | PRETTY_PRINT | UNESCAPED_UNICODE;

/// Legacy code for [`SchemaMode::Lax`]
pub const LAX_SCHEMA: u8 = 1;

/// Legacy code for [`SchemaMode::Strict`]
pub const STRICT_SCHEMA: u8 = 2;

/// Output formatting switches for [`encode`](crate::encode)
///
/// Each flag is independent. The default enables all three, which matches
/// what hand-edited manifests look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Emit `/` instead of `\/`
    pub unescaped_slashes: bool,
    /// Indent nested values with four spaces, one member per line
    pub pretty_print: bool,
    /// Emit non-ASCII characters verbatim instead of `\uXXXX`
    pub unescaped_unicode: bool,
}

impl EncodeOptions {
    /// Default options (all flags on)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All flags off: compact, fully escaped output
    #[inline]
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            unescaped_slashes: false,
            pretty_print: false,
            unescaped_unicode: false,
        }
    }

    /// With slash escaping toggled
    #[inline]
    #[must_use]
    pub const fn with_unescaped_slashes(mut self, on: bool) -> Self {
        self.unescaped_slashes = on;
        self
    }

    /// With pretty printing toggled
    #[inline]
    #[must_use]
    pub const fn with_pretty_print(mut self, on: bool) -> Self {
        self.pretty_print = on;
        self
    }

    /// With unicode escaping toggled
    #[inline]
    #[must_use]
    pub const fn with_unescaped_unicode(mut self, on: bool) -> Self {
        self.unescaped_unicode = on;
        self
    }

    /// Decode a legacy bit set. Unknown bits are ignored.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            unescaped_slashes: bits & UNESCAPED_SLASHES != 0,
            pretty_print: bits & PRETTY_PRINT != 0,
            unescaped_unicode: bits & UNESCAPED_UNICODE != 0,
        }
    }

    /// Encode as a legacy bit set
    #[must_use]
    pub const fn bits(self) -> u32 {
        let mut bits = 0;
        if self.unescaped_slashes {
            bits |= UNESCAPED_SLASHES;
        }
        if self.pretty_print {
            bits |= PRETTY_PRINT;
        }
        if self.unescaped_unicode {
            bits |= UNESCAPED_UNICODE;
        }
        bits
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from_bits(DEFAULT_OPTIONS)
    }
}

impl From<u32> for EncodeOptions {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

/// How strictly [`JsonFile::validate_schema`](crate::JsonFile::validate_schema)
/// applies the bundled schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    /// `name` and `description` optional, unknown top-level keys allowed
    Lax,
    /// Schema applied as written
    #[default]
    Strict,
}

impl SchemaMode {
    /// Legacy numeric code
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Lax => LAX_SCHEMA,
            Self::Strict => STRICT_SCHEMA,
        }
    }

    /// Parse a legacy numeric code
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            LAX_SCHEMA => Some(Self::Lax),
            STRICT_SCHEMA => Some(Self::Strict),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_legacy_448() {
        assert_eq!(DEFAULT_OPTIONS, 448);
        assert_eq!(EncodeOptions::default().bits(), 448);
        assert_eq!(EncodeOptions::from_bits(448), EncodeOptions::default());
    }

    #[test]
    fn bits_are_independent() {
        let opts = EncodeOptions::from_bits(PRETTY_PRINT);
        assert!(opts.pretty_print);
        assert!(!opts.unescaped_slashes);
        assert!(!opts.unescaped_unicode);

        let opts = EncodeOptions::from_bits(UNESCAPED_SLASHES | UNESCAPED_UNICODE);
        assert!(!opts.pretty_print);
        assert_eq!(opts.bits(), 320);
    }

    #[test]
    fn unknown_bits_ignored() {
        let opts = EncodeOptions::from_bits(PRETTY_PRINT | 1 | 2 | 1024);
        assert_eq!(opts.bits(), PRETTY_PRINT);
    }

    #[test]
    fn builder_toggles() {
        let opts = EncodeOptions::compact()
            .with_pretty_print(true)
            .with_unescaped_slashes(true);
        assert_eq!(opts.bits(), PRETTY_PRINT | UNESCAPED_SLASHES);
        assert_eq!(opts.with_pretty_print(false).bits(), UNESCAPED_SLASHES);
    }

    #[test]
    fn schema_mode_codes() {
        assert_eq!(SchemaMode::Lax.code(), 1);
        assert_eq!(SchemaMode::Strict.code(), 2);
        assert_eq!(SchemaMode::from_code(1), Some(SchemaMode::Lax));
        assert_eq!(SchemaMode::from_code(2), Some(SchemaMode::Strict));
        assert_eq!(SchemaMode::from_code(3), None);
        assert_eq!(SchemaMode::default(), SchemaMode::Strict);
    }
}

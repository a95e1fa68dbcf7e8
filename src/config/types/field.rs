//! Config field path used to point diagnostics at a TOML key.

use owo_colors::OwoColorize;
use std::fmt;

/// Dotted path of a config field, e.g. `fingerprint.extensions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Every field the validator can point at.
pub mod fields {
    use super::FieldPath;

    pub const BUILD_INPUT: FieldPath = FieldPath::new("build.input");
    pub const BUILD_OUTPUT: FieldPath = FieldPath::new("build.output");
    pub const FINGERPRINT_EXTENSIONS: FieldPath = FieldPath::new("fingerprint.extensions");
    pub const FINGERPRINT_EXCLUDE: FieldPath = FieldPath::new("fingerprint.exclude");
    pub const FINGERPRINT_HASH: FieldPath = FieldPath::new("fingerprint.algorithm");
    pub const FINGERPRINT_FIXED: FieldPath = FieldPath::new("fingerprint.fixed");
    pub const REWRITE_EXTENSIONS: FieldPath = FieldPath::new("rewrite.extensions");
    pub const REWRITE_EXCLUDE: FieldPath = FieldPath::new("rewrite.exclude");
    pub const ASSET_MAP_PATH: FieldPath = FieldPath::new("asset_map.path");
    pub const MANIFEST_PATH: FieldPath = FieldPath::new("manifest.path");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_str() {
        assert_eq!(fields::MANIFEST_PATH.as_str(), "manifest.path");
        assert_eq!(fields::BUILD_INPUT.as_ref(), "build.input");
    }
}

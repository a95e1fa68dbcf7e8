//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! input = "dist"        # source tree
//! output = "dist-rev"   # destination tree, may equal input
//! two_pass = true
//! clean = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, fields};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Directory holding the materialized input tree.
    pub input: PathBuf,

    /// Directory receiving the fingerprinted tree.
    /// Equal to `input` for in-place builds.
    pub output: PathBuf,

    /// Fingerprint non-rewritable assets first, then the rewritten files.
    pub two_pass: bool,

    /// Remove an existing output directory before building.
    /// Ignored for in-place builds.
    pub clean: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            input: "dist".into(),
            output: "dist-rev".into(),
            two_pass: false,
            clean: false,
        }
    }
}

impl BuildSectionConfig {
    /// Whether the build rewrites the input tree itself.
    pub fn is_in_place(&self) -> bool {
        self.input == self.output
    }

    /// Resolve relative paths against `root`.
    pub fn normalize_paths(&mut self, root: &Path) {
        if self.input.is_relative() {
            self.input = root.join(&self.input);
        }
        if self.output.is_relative() {
            self.output = root.join(&self.output);
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.input.is_dir() {
            diag.error(
                fields::BUILD_INPUT,
                format!("input directory `{}` does not exist", self.input.display()),
            );
        }

        if self.is_in_place() {
            return;
        }
        let nested = if self.output.starts_with(&self.input) {
            Some("output directory must not be nested inside input")
        } else if self.input.starts_with(&self.output) {
            Some("output directory must not contain input")
        } else {
            None
        };
        if let Some(message) = nested {
            diag.error_with_hint(
                fields::BUILD_OUTPUT,
                message,
                "use a sibling directory, or set output = input for an in-place build",
            );
        }
    }
}

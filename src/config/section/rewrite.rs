//! `[rewrite]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [rewrite]
//! extensions = ["html", "css", "js"]
//! exclude = ["vendor/"]
//! prepend = "https://cdn.example.com/"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, ConfigError, fields};
use crate::fingerprint::FileFilter;

use super::{validate_extensions, validate_patterns};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Extensions of files whose references get rewritten.
    pub extensions: Vec<String>,

    /// Paths never rewritten. Independent of `fingerprint.exclude`.
    pub exclude: Vec<String>,

    /// Prefix replacing the leading path of every rewritten reference.
    pub prepend: String,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            extensions: ["html", "css", "js"].map(String::from).to_vec(),
            exclude: Vec::new(),
            prepend: String::new(),
        }
    }
}

impl RewriteConfig {
    pub fn filter(&self) -> Result<FileFilter, ConfigError> {
        FileFilter::new(self.extensions.iter().cloned(), &self.exclude)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.extensions.is_empty() {
            diag.error_with_hint(
                fields::REWRITE_EXTENSIONS,
                "no extensions to rewrite",
                "list extensions such as [\"html\", \"css\"]",
            );
        }
        validate_extensions(fields::REWRITE_EXTENSIONS, &self.extensions, diag);
        validate_patterns(fields::REWRITE_EXCLUDE, &self.exclude, diag);
    }
}

//! Eligibility of files for fingerprinting or rewriting.
//!
//! A path is eligible when no exclusion matches it and its extension is in
//! the allow-list. Exclusions are checked first and always win. All
//! matching is case-sensitive.
//!
//! Exclusion patterns are fragments matched anywhere in the relative path:
//!
//! ```text
//! "vendor/"          substring: vendor/jquery.js, lib/vendor/x.css
//! "fonts/*.woff"     glob: `*` stays inside one segment
//! "legacy/**.js"     glob: `**` crosses segments
//! "icon-?.png"       glob: `?` is one non-separator char
//! ```

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::config::ConfigError;

use super::path::extension;

/// One exclusion rule.
#[derive(Debug, Clone)]
pub enum ExcludePattern {
    /// Plain substring containment.
    Fragment(String),
    /// Glob fragment compiled to an unanchored regex.
    Glob(Regex),
}

impl ExcludePattern {
    /// Parse a pattern: anything containing `*` or `?` is a glob.
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        if !pattern.contains(['*', '?']) {
            return Ok(Self::Fragment(pattern.to_string()));
        }

        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|err| {
            ConfigError::Validation(format!("invalid exclude pattern `{pattern}`: {err}"))
        })?;
        Ok(Self::Glob(regex))
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Fragment(fragment) => path.contains(fragment.as_str()),
            Self::Glob(regex) => regex.is_match(path),
        }
    }
}

/// Translate a glob fragment into regex syntax.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

/// Extension allow-list plus exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: FxHashSet<String>,
    exclude: Vec<ExcludePattern>,
}

impl FileFilter {
    /// Build a filter from raw configuration values.
    pub fn new<E, X>(extensions: E, exclude: X) -> Result<Self, ConfigError>
    where
        E: IntoIterator,
        E::Item: Into<String>,
        X: IntoIterator,
        X::Item: AsRef<str>,
    {
        let exclude = exclude
            .into_iter()
            .map(|p| ExcludePattern::parse(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            exclude,
        })
    }

    /// Whether `path` (relative, `/`-separated) should be processed.
    pub fn is_eligible(&self, path: &str) -> bool {
        !self.is_excluded(path)
            && extension(path).is_some_and(|ext| self.extensions.contains(ext))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(path))
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }

    /// Copy of this filter keeping only extensions accepted by `keep`.
    ///
    /// Used by two-pass builds to split the fingerprint set into assets that
    /// are never rewritten and assets that are.
    pub fn retain_extensions(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            extensions: self
                .extensions
                .iter()
                .filter(|ext| keep(ext))
                .cloned()
                .collect(),
            exclude: self.exclude.clone(),
        }
    }
}

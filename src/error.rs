//! Build error and warning types.
//!
//! Errors abort the build. Warnings are collected into the build report
//! and left to the caller to surface.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal build errors.
#[derive(Debug, Error)]
pub enum RevError {
    /// Source unreadable or destination unwritable.
    #[error("IO error at `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An existing manifest could not be merged.
    #[error("malformed manifest `{}`: {reason}", .path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize manifest")]
    Serialize(#[from] serde_json::Error),
}

impl RevError {
    /// Wrap an IO error with the path it occurred at.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = RevError> = std::result::Result<T, E>;

/// Attach a path to IO results.
pub trait IoResultExt<T> {
    fn at(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    #[inline]
    fn at(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|err| RevError::io(path, err))
    }
}

/// Non-fatal conditions reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// More than one existing manifest matched; `used` was merged.
    AmbiguousManifest { found: Vec<PathBuf>, used: PathBuf },
    /// A rewrite-eligible file was not valid UTF-8 and was left untouched.
    UndecodableText { path: String },
    /// A fingerprinted name carried no hexadecimal digest suffix.
    MissingDigest { path: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousManifest { found, used } => {
                write!(
                    f,
                    "found {} existing manifests, merging into `{}`",
                    found.len(),
                    used.display()
                )
            }
            Self::UndecodableText { path } => {
                write!(f, "`{path}` is not valid UTF-8, references left as-is")
            }
            Self::MissingDigest { path } => {
                write!(f, "`{path}` has no hex digest suffix, recorded with empty digest")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_includes_path() {
        let err = RevError::io(
            "public/app.js",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = format!("{err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("public/app.js"));
    }

    #[test]
    fn test_io_result_ext() {
        let res: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        match res.at("a/b.css") {
            Err(RevError::Io { path, .. }) => assert_eq!(path, PathBuf::from("a/b.css")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_warning_display() {
        let warning = BuildWarning::AmbiguousManifest {
            found: vec![
                PathBuf::from("assets/manifest-a.json"),
                PathBuf::from("assets/manifest-b.json"),
            ],
            used: PathBuf::from("assets/manifest-a.json"),
        };
        let display = format!("{warning}");
        assert!(display.contains("2 existing manifests"));
        assert!(display.contains("manifest-a.json"));
    }
}

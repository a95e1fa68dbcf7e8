//! `[asset_map]` and `[manifest]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [asset_map]
//! enable = true
//! fingerprint = false
//! path = "assets/assetMap.json"
//!
//! [manifest]
//! enable = true
//! fingerprint = true
//! path = "assets/manifest.json"
//! ```
//!
//! Both paths are relative to the output directory.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath, fields};

/// The `{assets, prepend}` document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetMapConfig {
    pub enable: bool,

    /// Fingerprint the map file itself.
    pub fingerprint: bool,

    pub path: String,
}

impl Default for AssetMapConfig {
    fn default() -> Self {
        Self {
            enable: false,
            fingerprint: false,
            path: "assets/assetMap.json".into(),
        }
    }
}

impl AssetMapConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable {
            validate_output_path(fields::ASSET_MAP_PATH, &self.path, diag);
        }
    }
}

/// The legacy per-asset manifest with size, mtime and digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub enable: bool,

    /// Fingerprint the manifest file itself (md5).
    pub fingerprint: bool,

    pub path: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            enable: false,
            fingerprint: true,
            path: "assets/manifest.json".into(),
        }
    }
}

impl ManifestConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable {
            validate_output_path(fields::MANIFEST_PATH, &self.path, diag);
        }
    }
}

/// Output-relative file path: relative, no `..`, names a file.
fn validate_output_path(field: FieldPath, path: &str, diag: &mut ConfigDiagnostics) {
    let p = Path::new(path);
    if path.is_empty() || p.file_name().is_none() {
        diag.error(field, format!("`{path}` does not name a file"));
    } else if p.is_absolute() || path.starts_with('/') {
        diag.error_with_hint(
            field,
            format!("`{path}` must be relative to the output directory"),
            format!("use `{}`", path.trim_start_matches('/')),
        );
    } else if p.components().any(|c| matches!(c, Component::ParentDir)) {
        diag.error(field, format!("`{path}` must stay inside the output directory"));
    } else if path.contains('\\') {
        diag.error(field, format!("`{path}` must use `/` separators"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(path: &str) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();
        validate_output_path(fields::MANIFEST_PATH, path, &mut diag);
        diag
    }

    #[test]
    fn test_output_paths() {
        assert!(check("assets/manifest.json").is_empty());
        assert!(check("manifest.json").is_empty());
        assert!(!check("/assets/manifest.json").is_empty());
        assert!(!check("../manifest.json").is_empty());
        assert!(!check("").is_empty());
        assert!(!check("assets/..").is_empty());
    }

    #[test]
    fn test_disabled_skips_validation() {
        let config = ManifestConfig {
            enable: false,
            path: "/abs.json".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert!(diag.is_empty());

        let config = AssetMapConfig {
            enable: true,
            path: "/abs.json".into(),
            ..Default::default()
        };
        config.validate(&mut diag);
        assert!(diag.mentions(fields::ASSET_MAP_PATH));
    }

    #[test]
    fn test_defaults() {
        assert!(ManifestConfig::default().fingerprint);
        assert!(!AssetMapConfig::default().fingerprint);
        assert_eq!(AssetMapConfig::default().path, "assets/assetMap.json");
    }
}

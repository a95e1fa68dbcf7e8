//! Sprockets-style manifest, merged across builds.
//!
//! ```json
//! {
//!   "assets": { "app.js": "app-5eb6….js" },
//!   "files": {
//!     "app-5eb6….js": {
//!       "mtime": "2015-01-01T08:00:00.000Z",
//!       "logical_path": "app.js",
//!       "digest": "5eb6…",
//!       "size": 11
//!     }
//!   }
//! }
//! ```
//!
//! Only mapping entries under `assets/` are listed, with that root stripped
//! from both sides. An earlier manifest next to the configured path, named
//! `<stem>.<ext>` or `<stem>-<32 hex>.<ext>`, is merged in and removed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::error::{BuildWarning, IoResultExt, Result, RevError};
use crate::fingerprint::{HashAlgorithm, fingerprinted_path};
use crate::utils::date::DateTimeUtc;
use crate::utils::path::{join_key, write_file};

/// Asset root stripped from manifest keys.
const ASSET_ROOT: &str = "assets/";

static RE_DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9a-f]+)\.[A-Za-z0-9_]+$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestDocument {
    /// Logical path → fingerprinted logical path.
    pub assets: BTreeMap<String, String>,
    /// Fingerprinted logical path → file facts.
    pub files: BTreeMap<String, ManifestFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub mtime: String,
    pub logical_path: String,
    pub digest: String,
    pub size: u64,
    /// Fields written by other tools, kept on merge.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ManifestDocument {
    /// Overlay `newer`; its entries win on key collisions.
    pub fn merge(&mut self, newer: Self) {
        self.assets.extend(newer.assets);
        self.files.extend(newer.files);
    }
}

/// Result of [`write_manifest`].
#[derive(Debug)]
pub struct ManifestOutcome {
    /// Relative path of the written manifest.
    pub path: String,
    pub document: ManifestDocument,
    pub warnings: Vec<BuildWarning>,
}

/// Options for [`write_manifest`].
#[derive(Debug, Clone, Copy)]
pub struct ManifestTarget<'a> {
    /// Output-relative manifest path, e.g. `assets/manifest.json`.
    pub path: &'a str,
    /// Suffix the manifest's own name with the md5 of its content.
    pub fingerprint: bool,
}

/// Build the manifest from `mapping`, merge any earlier one, and write it.
pub fn write_manifest(
    output: &Path,
    mapping: &BTreeMap<String, String>,
    target: ManifestTarget<'_>,
) -> Result<ManifestOutcome> {
    let mut warnings = Vec::new();
    let fresh = collect_entries(output, mapping, &mut warnings)?;

    let (dir_key, file_name) = match target.path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", target.path),
    };
    let dir = join_key(output, dir_key);

    let mut document = ManifestDocument::default();
    let existing = find_existing(&dir, file_name)?;
    if let Some(used) = existing.first() {
        if existing.len() > 1 {
            warnings.push(BuildWarning::AmbiguousManifest {
                found: existing.clone(),
                used: used.clone(),
            });
        }
        document = read_manifest(used)?;
        fs::remove_file(used).at(used)?;
    }
    document.merge(fresh);

    let bytes = serde_json::to_vec(&document)?;
    let path = if target.fingerprint {
        fingerprinted_path(target.path, &HashAlgorithm::Md5.hex(&bytes))
    } else {
        target.path.to_string()
    };
    write_file(&join_key(output, &path), &bytes)?;

    Ok(ManifestOutcome {
        path,
        document,
        warnings,
    })
}

/// Manifest entries for every mapped path under the asset root.
fn collect_entries(
    output: &Path,
    mapping: &BTreeMap<String, String>,
    warnings: &mut Vec<BuildWarning>,
) -> Result<ManifestDocument> {
    let mut document = ManifestDocument::default();

    for (original, fingerprinted) in mapping {
        let Some(logical) = original.strip_prefix(ASSET_ROOT) else {
            continue;
        };
        let logical_fp = fingerprinted
            .strip_prefix(ASSET_ROOT)
            .unwrap_or(fingerprinted);

        let file = join_key(output, fingerprinted);
        let meta = fs::metadata(&file).at(&file)?;
        let mtime = meta.modified().at(&file)?;

        let digest = extract_digest(fingerprinted).unwrap_or_else(|| {
            warnings.push(BuildWarning::MissingDigest {
                path: fingerprinted.clone(),
            });
            String::new()
        });

        document
            .assets
            .insert(logical.to_string(), logical_fp.to_string());
        document.files.insert(
            logical_fp.to_string(),
            ManifestFile {
                mtime: DateTimeUtc::from_system_time(mtime).to_rfc3339_millis(),
                logical_path: logical.to_string(),
                digest,
                size: meta.len(),
                extra: serde_json::Map::new(),
            },
        );
    }

    Ok(document)
}

/// Hex digest embedded as `-<hex>.<ext>` at the end of a name.
pub fn extract_digest(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    RE_DIGEST.captures(name).map(|caps| caps[1].to_string())
}

/// Regex recognising `<stem>.<ext>` and `<stem>-<32 hex>.<ext>`.
fn manifest_name_pattern(file_name: &str) -> std::result::Result<Regex, ConfigError> {
    let pattern = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!(
            "^{}(-[0-9a-f]{{32}})?\\.{}$",
            regex::escape(stem),
            regex::escape(ext)
        ),
        _ => format!("^{}(-[0-9a-f]{{32}})?$", regex::escape(file_name)),
    };
    Regex::new(&pattern)
        .map_err(|err| ConfigError::Validation(format!("manifest name `{file_name}`: {err}")))
}

/// Earlier manifests in `dir`, sorted by file name.
fn find_existing(dir: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = manifest_name_pattern(file_name)?;

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let is_file = entry.file_type().at(entry.path())?.is_file();
        if is_file && entry.file_name().to_str().is_some_and(|n| pattern.is_match(n)) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

fn read_manifest(path: &Path) -> Result<ManifestDocument> {
    let bytes = fs::read(path).at(path)?;
    serde_json::from_slice(&bytes).map_err(|err| RevError::MalformedManifest {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

//! Mapping documents written after rewriting.
//!
//! | Output      | Module      | Default path             |
//! |-------------|-------------|--------------------------|
//! | asset map   | `asset_map` | `assets/assetMap.json`   |
//! | manifest    | `legacy`    | `assets/manifest.json`   |
//!
//! The asset map is written first, so a fingerprinted asset map shows up
//! in the manifest like any other asset.

mod asset_map;
mod legacy;

pub use asset_map::{AssetMapDocument, write_asset_map};
pub use legacy::{
    ManifestDocument, ManifestFile, ManifestOutcome, ManifestTarget, extract_digest,
    write_manifest,
};

use std::path::Path;

use crate::config::RevConfig;
use crate::debug;
use crate::error::{BuildWarning, Result};
use crate::fingerprint::PathFingerprinter;

/// Paths written by [`ManifestWriter::write`].
#[derive(Debug, Default)]
pub struct ManifestReport {
    pub asset_map: Option<String>,
    pub manifest: Option<String>,
    pub warnings: Vec<BuildWarning>,
}

/// Emits whichever documents the configuration enables.
pub struct ManifestWriter<'a> {
    output: &'a Path,
    config: &'a RevConfig,
    fingerprinter: PathFingerprinter<'a>,
}

impl<'a> ManifestWriter<'a> {
    pub const fn new(
        output: &'a Path,
        config: &'a RevConfig,
        fingerprinter: PathFingerprinter<'a>,
    ) -> Self {
        Self {
            output,
            config,
            fingerprinter,
        }
    }

    pub fn write(&self) -> Result<ManifestReport> {
        let mut report = ManifestReport::default();

        let asset_map = &self.config.asset_map;
        if asset_map.enable {
            let fingerprint =
                asset_map.fingerprint && !self.config.fingerprint.excludes(&asset_map.path);
            let path = write_asset_map(
                self.output,
                &asset_map.path,
                &self.config.rewrite.prepend,
                self.fingerprinter,
                fingerprint,
            )?;
            debug!("manifest"; "{}", path);
            report.asset_map = Some(path);
        }

        let manifest = &self.config.manifest;
        if manifest.enable {
            let target = ManifestTarget {
                path: &manifest.path,
                fingerprint: manifest.fingerprint
                    && !self.config.fingerprint.excludes(&manifest.path),
            };
            let outcome =
                write_manifest(self.output, &self.fingerprinter.mapping().snapshot(), target)?;
            debug!("manifest"; "{} ({} assets)", outcome.path, outcome.document.assets.len());
            report.manifest = Some(outcome.path);
            report.warnings.extend(outcome.warnings);
        }

        Ok(report)
    }
}

//! Build orchestration.
//!
//! # Architecture
//!
//! ```text
//! Init ─▶ Fingerprinting ─▶ Rewriting ─▶ ManifestEmission ─▶ Done
//!
//! two_pass:
//! Init ─▶ Fingerprinting(1) ─▶ Rewriting(1) ─▶ Fingerprinting(2) ─▶ Rewriting(2) ─▶ …
//!         fingerprint − rewrite exts           fingerprint ∩ rewrite exts, in place
//! ```
//!
//! States only move forward. Any error aborts the build, so no manifest is
//! written after a failed fingerprinting or rewriting step.


use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::RevConfig;
use crate::debug;
use crate::error::{BuildWarning, IoResultExt, Result};
use crate::fingerprint::{
    AssetMapping, ContentHasher, FileFilter, FingerprintStage, FingerprintSummary,
    PathFingerprinter,
};
use crate::logger::ProgressLine;
use crate::manifest::ManifestWriter;
use crate::rewrite::{ReferenceRewriter, RewriteStage};
use crate::utils::path::collect_files;

/// Where a build currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Init,
    Fingerprinting { pass: u8 },
    Rewriting { pass: u8 },
    ManifestEmission,
    Done,
}

impl BuildState {
    /// Position in the forward-only sequence.
    const fn rank(self) -> (u8, u8) {
        match self {
            Self::Init => (0, 0),
            Self::Fingerprinting { pass } => (pass, 1),
            Self::Rewriting { pass } => (pass, 2),
            Self::ManifestEmission => (u8::MAX, 0),
            Self::Done => (u8::MAX, 1),
        }
    }
}

/// Everything a finished build reports back.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Final original → fingerprinted mapping.
    pub mapping: BTreeMap<String, String>,
    pub fingerprint: FingerprintSummary,
    /// Files whose references were rewritten, summed over passes.
    pub rewritten: usize,
    /// Relative path of the written asset map.
    pub asset_map: Option<String>,
    /// Relative path of the written manifest.
    pub manifest: Option<String>,
    pub warnings: Vec<BuildWarning>,
}

/// A single build over one configuration.
pub struct Build<'a> {
    config: &'a RevConfig,
    state: BuildState,
    hasher: ContentHasher,
    mapping: AssetMapping,
    fingerprint_filter: FileFilter,
    rewrite_filter: FileFilter,
    progress: Option<ProgressLine>,
    report: BuildReport,
}

impl<'a> Build<'a> {
    /// Validate `config` and resolve the hash policy and filters.
    ///
    /// Configuration errors surface here, before any file is touched.
    pub fn new(config: &'a RevConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: BuildState::Init,
            hasher: ContentHasher::new(config.hash_policy()?),
            mapping: AssetMapping::new(),
            fingerprint_filter: config.fingerprint_filter()?,
            rewrite_filter: config.rewrite_filter()?,
            progress: None,
            report: BuildReport::default(),
        })
    }

    pub const fn state(&self) -> BuildState {
        self.state
    }

    fn advance(&mut self, next: BuildState) {
        debug_assert!(
            next.rank() > self.state.rank(),
            "build state went backwards: {:?} -> {:?}",
            self.state,
            next
        );
        debug!("build"; "{:?}", next);
        self.state = next;
    }

    fn fingerprinter(&self) -> PathFingerprinter<'_> {
        PathFingerprinter::new(&self.hasher, &self.mapping)
    }

    /// Run every state to completion.
    pub fn run(mut self, show_progress: bool) -> Result<BuildReport> {
        let config = self.config;
        let input = config.build.input.as_path();
        let output = config.build.output.as_path();

        let files = self.init()?;
        if show_progress {
            self.progress = Some(self.create_progress(&files));
        }

        if config.build.two_pass {
            let rewrite_filter = &self.rewrite_filter;
            let first = self
                .fingerprint_filter
                .retain_extensions(|ext| !rewrite_filter.allows_extension(ext));
            let second = self
                .fingerprint_filter
                .retain_extensions(|ext| rewrite_filter.allows_extension(ext));

            let files = self.pass(1, input, &files, &first)?;
            self.pass(2, output, &files, &second)?;
        } else {
            let filter = self.fingerprint_filter.clone();
            self.pass(1, input, &files, &filter)?;
        }

        self.advance(BuildState::ManifestEmission);
        let manifests = ManifestWriter::new(output, config, self.fingerprinter()).write()?;
        self.report.asset_map = manifests.asset_map;
        self.report.manifest = manifests.manifest;
        self.report.warnings.extend(manifests.warnings);

        self.advance(BuildState::Done);
        if let Some(progress) = self.progress.take() {
            progress.finish();
        }
        self.report.mapping = self.mapping.snapshot();
        Ok(self.report)
    }

    /// Prepare the output directory and list the input tree.
    fn init(&self) -> Result<Vec<String>> {
        let build = &self.config.build;
        if build.clean && !build.is_in_place() && build.output.exists() {
            debug!("build"; "cleaning {}", build.output.display());
            fs::remove_dir_all(&build.output).at(&build.output)?;
        }
        fs::create_dir_all(&build.output).at(&build.output)?;
        collect_files(&build.input)
    }

    fn create_progress(&self, files: &[String]) -> ProgressLine {
        let passes = if self.config.build.two_pass { 2 } else { 1 };
        let fingerprint = files
            .iter()
            .filter(|f| self.fingerprint_filter.is_eligible(f))
            .count();
        let rewrite = files
            .iter()
            .filter(|f| self.rewrite_filter.is_eligible(f))
            .count();
        ProgressLine::new(&[("fingerprint", fingerprint), ("rewrite", rewrite * passes)])
    }

    /// Fingerprint `files` from `source` into the output tree, then rewrite.
    ///
    /// Returns the file list as it stands in the output tree afterwards.
    fn pass(
        &mut self,
        pass: u8,
        source: &Path,
        files: &[String],
        filter: &FileFilter,
    ) -> Result<Vec<String>> {
        let config = self.config;
        let output = config.build.output.as_path();

        self.advance(BuildState::Fingerprinting { pass });
        let summary = FingerprintStage::new(source, output, filter, self.fingerprinter())
            .with_progress(self.progress.as_ref())
            .run(files)?;
        self.report.fingerprint = self.report.fingerprint.merge(summary);

        let renamed: Vec<String> = files
            .iter()
            .map(|key| self.mapping.get(key).unwrap_or_else(|| key.clone()))
            .collect();

        self.advance(BuildState::Rewriting { pass });
        let rewriter = ReferenceRewriter::new(&self.mapping.snapshot(), &config.rewrite.prepend);
        let summary = RewriteStage::new(output, &self.rewrite_filter, &rewriter)
            .with_progress(self.progress.as_ref())
            .run(&renamed)?;
        self.report.rewritten += summary.rewritten;
        self.report.warnings.extend(summary.warnings);

        Ok(renamed)
    }
}

/// Build `config` end to end.
pub fn run_build(config: &RevConfig, show_progress: bool) -> Result<BuildReport> {
    Build::new(config)?.run(show_progress)
}

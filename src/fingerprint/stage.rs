//! Fingerprinting of a whole file tree.
//!
//! ```text
//! input/                         output/
//! ├── index.html      copy ───▶ ├── index.html
//! ├── app.js          hash ───▶ ├── app-5eb63bbb….js
//! └── img/logo.png    hash ───▶ └── img/logo-7d9c….png
//! ```
//!
//! Files are processed in parallel; the first error aborts the stage.
//! When input and output are the same directory, eligible files are
//! renamed in place and everything else is left alone.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::debug;
use crate::error::{IoResultExt, Result};
use crate::logger::ProgressLine;
use crate::utils::path::{copy_file, join_key, write_file};

use super::{FileFilter, PathFingerprinter};

/// One file as seen by the stage.
#[derive(Debug)]
pub struct FileRecord {
    /// Relative `/`-separated path in the input tree.
    pub path: String,
    /// File bytes, loaded only when hashing or copying needs them.
    pub content: Option<Vec<u8>>,
    /// Relative path in the output tree.
    pub output_path: String,
    /// The mapping already existed; nothing was hashed.
    pub reused: bool,
}

impl FileRecord {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            content: None,
            output_path: path.to_string(),
            reused: false,
        }
    }

    fn renamed(&self) -> bool {
        self.path != self.output_path
    }
}

/// Per-file outcome, folded into a [`FingerprintSummary`].
enum Outcome {
    Fingerprinted,
    Reused,
    Unchanged,
    Copied,
    /// Not eligible and already in place; not counted.
    Skipped,
}

/// Counts reported by [`FingerprintStage::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FingerprintSummary {
    /// Freshly hashed and recorded.
    pub fingerprinted: usize,
    /// Eligible, mapped earlier in the build.
    pub reused: usize,
    /// Eligible but kept its name (empty fixed digest or disabled hashing).
    pub unchanged: usize,
    /// Not eligible, copied verbatim.
    pub copied: usize,
}

impl FingerprintSummary {
    fn record(mut self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Fingerprinted => self.fingerprinted += 1,
            Outcome::Reused => self.reused += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Copied => self.copied += 1,
            Outcome::Skipped => {}
        }
        self
    }

    /// Sum of two summaries.
    pub fn merge(self, other: Self) -> Self {
        Self {
            fingerprinted: self.fingerprinted + other.fingerprinted,
            reused: self.reused + other.reused,
            unchanged: self.unchanged + other.unchanged,
            copied: self.copied + other.copied,
        }
    }
}

/// Copies (or renames in place) a tree, fingerprinting eligible files.
pub struct FingerprintStage<'a> {
    input: &'a Path,
    output: &'a Path,
    filter: &'a FileFilter,
    fingerprinter: PathFingerprinter<'a>,
    progress: Option<&'a ProgressLine>,
}

impl<'a> FingerprintStage<'a> {
    pub const fn new(
        input: &'a Path,
        output: &'a Path,
        filter: &'a FileFilter,
        fingerprinter: PathFingerprinter<'a>,
    ) -> Self {
        Self {
            input,
            output,
            filter,
            fingerprinter,
            progress: None,
        }
    }

    pub const fn with_progress(mut self, progress: Option<&'a ProgressLine>) -> Self {
        self.progress = progress;
        self
    }

    fn in_place(&self) -> bool {
        self.input == self.output
    }

    /// Process every relative path in `files`.
    pub fn run(&self, files: &[String]) -> Result<FingerprintSummary> {
        files
            .par_iter()
            .map(|key| -> Result<FingerprintSummary> {
                let outcome = self.process(key)?;
                Ok(FingerprintSummary::default().record(outcome))
            })
            .try_reduce(FingerprintSummary::default, |a, b| Ok(a.merge(b)))
    }

    fn process(&self, key: &str) -> Result<Outcome> {
        let source = join_key(self.input, key);

        if !self.filter.is_eligible(key) {
            if self.in_place() {
                return Ok(Outcome::Skipped);
            }
            copy_file(&source, &join_key(self.output, key))?;
            return Ok(Outcome::Copied);
        }

        let mut record = FileRecord::new(key);
        if self.fingerprinter.hasher().reads_content() || !self.in_place() {
            record.content = Some(fs::read(&source).at(&source)?);
        }

        let resolved = self.fingerprinter.fingerprint(key, || {
            Ok(record.content.as_deref().unwrap_or_default())
        })?;
        if let Some(resolved) = resolved {
            record.reused = resolved.is_existing();
            record.output_path = resolved.into_path();
        }

        self.write(&record, &source)?;
        if let Some(progress) = self.progress {
            progress.inc("fingerprint");
        }

        Ok(if record.reused {
            Outcome::Reused
        } else if record.renamed() {
            Outcome::Fingerprinted
        } else {
            Outcome::Unchanged
        })
    }

    /// Materialize `record` in the output tree.
    fn write(&self, record: &FileRecord, source: &Path) -> Result<()> {
        let dest = join_key(self.output, &record.output_path);

        if self.in_place() {
            if !record.renamed() {
                return Ok(());
            }
            debug!("fingerprint"; "{} -> {}", record.path, record.output_path);
            return match &record.content {
                Some(bytes) => {
                    write_file(&dest, bytes)?;
                    fs::remove_file(source).at(source)
                }
                None => fs::rename(source, &dest).at(&dest),
            };
        }

        match &record.content {
            Some(bytes) => write_file(&dest, bytes),
            None => copy_file(source, &dest),
        }
    }
}

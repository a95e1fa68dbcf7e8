//! Apply a [`ReferenceRewriter`] to files of a tree in place.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::debug;
use crate::error::{BuildWarning, IoResultExt, Result};
use crate::fingerprint::FileFilter;
use crate::logger::ProgressLine;
use crate::utils::path::join_key;

use super::ReferenceRewriter;

/// Counts and warnings reported by [`RewriteStage::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteSummary {
    /// Files whose content changed.
    pub rewritten: usize,
    /// Eligible files without any matching reference.
    pub unchanged: usize,
    pub warnings: Vec<BuildWarning>,
}

enum Outcome {
    Rewritten,
    Unchanged,
    Skipped(BuildWarning),
}

pub struct RewriteStage<'a> {
    root: &'a Path,
    filter: &'a FileFilter,
    rewriter: &'a ReferenceRewriter,
    progress: Option<&'a ProgressLine>,
}

impl<'a> RewriteStage<'a> {
    pub const fn new(root: &'a Path, filter: &'a FileFilter, rewriter: &'a ReferenceRewriter) -> Self {
        Self {
            root,
            filter,
            rewriter,
            progress: None,
        }
    }

    pub const fn with_progress(mut self, progress: Option<&'a ProgressLine>) -> Self {
        self.progress = progress;
        self
    }

    /// Rewrite every eligible file among `files` (relative to the root).
    ///
    /// Files are only written back when their content changed.
    pub fn run(&self, files: &[String]) -> Result<RewriteSummary> {
        let eligible: Vec<&String> = files.iter().filter(|f| self.filter.is_eligible(f)).collect();
        if self.rewriter.is_empty() {
            return Ok(RewriteSummary {
                unchanged: eligible.len(),
                ..Default::default()
            });
        }

        let outcomes = eligible
            .par_iter()
            .map(|key| self.process(key))
            .collect::<Result<Vec<_>>>()?;

        let mut summary = RewriteSummary::default();
        for outcome in outcomes {
            match outcome {
                Outcome::Rewritten => summary.rewritten += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::Skipped(warning) => summary.warnings.push(warning),
            }
        }
        Ok(summary)
    }

    fn process(&self, key: &str) -> Result<Outcome> {
        let path = join_key(self.root, key);
        let bytes = fs::read(&path).at(&path)?;

        let outcome = match String::from_utf8(bytes) {
            Err(_) => Outcome::Skipped(BuildWarning::UndecodableText {
                path: key.to_string(),
            }),
            Ok(text) => match self.rewriter.rewrite(&text) {
                Cow::Borrowed(_) => Outcome::Unchanged,
                Cow::Owned(rewritten) => {
                    debug!("rewrite"; "{}", key);
                    fs::write(&path, rewritten).at(&path)?;
                    Outcome::Rewritten
                }
            },
        };

        if let Some(progress) = self.progress {
            progress.inc("rewrite");
        }
        Ok(outcome)
    }
}

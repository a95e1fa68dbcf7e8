//! Reference rewriting.
//!
//! `scan` finds and replaces delimited references in a string; `stage`
//! applies that to the rewrite-eligible files of a tree.

mod scan;
mod stage;

pub use scan::ReferenceRewriter;
pub use stage::{RewriteStage, RewriteSummary};

//! Content-hash fingerprinting for static asset trees.
//!
//! Copies an input tree to an output tree (or works in place), renames
//! eligible files to `name-<digest>.ext`, rewrites references to them in
//! text files, and optionally records the mapping as JSON documents.
//!
//! ```ignore
//! use asset_rev::{config::RevConfig, pipeline::run_build};
//!
//! let config = RevConfig::default().with_root("site");
//! let report = run_build(&config, false)?;
//! println!("{:?}", report.mapping);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logger;
pub mod manifest;
pub mod pipeline;
pub mod rewrite;
pub mod utils;

pub use config::RevConfig;
pub use error::{BuildWarning, Result, RevError};
pub use pipeline::{BuildReport, run_build};

//! Command-line interface module.

mod args;
pub mod build;
pub mod hash;

pub use args::{BuildArgs, Cli, Commands};

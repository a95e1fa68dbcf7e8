//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::fingerprint::HashAlgorithm;

/// Fingerprint static assets and rewrite references to them
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "asset-rev.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fingerprint an input tree into an output tree
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Print the fingerprinted name each file would receive
    #[command(visible_alias = "h")]
    Hash {
        /// Files to hash
        #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// Digest algorithm, overriding the configured hash policy
        #[arg(short, long, value_enum)]
        algorithm: Option<HashAlgorithm>,
    },
}

/// Build arguments; each one overrides the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Input directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Output directory (relative to project root); may equal input
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Prefix for rewritten references, e.g. a CDN origin
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub prepend: Option<String>,

    /// Fingerprint rewritable files after their references are rewritten
    #[arg(short = 'T', long = "two-pass", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub two_pass: Option<bool>,

    /// Remove the output directory before building
    #[arg(short, long)]
    pub clean: bool,

    /// Emit the asset map document
    #[arg(short = 'A', long = "asset-map", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub asset_map: Option<bool>,

    /// Emit the legacy manifest
    #[arg(short = 'M', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub manifest: Option<bool>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Suppress the progress line and summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "asset-rev", "build", "-i", "dist", "-o", "dist", "--prepend", "https://cdn/",
            "--two-pass", "--manifest=false",
        ])
        .unwrap();
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert_eq!(build_args.input, Some(PathBuf::from("dist")));
        assert_eq!(build_args.prepend.as_deref(), Some("https://cdn/"));
        assert_eq!(build_args.two_pass, Some(true));
        assert_eq!(build_args.manifest, Some(false));
        assert_eq!(build_args.asset_map, None);
    }

    #[test]
    fn test_parse_hash() {
        let cli = Cli::try_parse_from(["asset-rev", "hash", "-a", "blake3", "a.js", "b.css"]).unwrap();
        let Commands::Hash { files, algorithm } = cli.command else {
            panic!("expected hash");
        };
        assert_eq!(files.len(), 2);
        assert_eq!(algorithm, Some(HashAlgorithm::Blake3));
        assert!(!Cli::try_parse_from(["asset-rev", "build"]).unwrap().config.is_absolute());
    }
}

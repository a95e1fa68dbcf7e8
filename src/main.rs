//! asset-rev - fingerprint static assets and rewrite references to them.

use anyhow::Result;
use asset_rev::{
    cli::{self, Cli, Commands},
    config::RevConfig,
};
use clap::{ColorChoice, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = RevConfig::load(&cli)?;

    match &cli.command {
        Commands::Build { build_args } => cli::build::build_assets(&config, build_args),
        Commands::Hash { files, algorithm } => cli::hash::hash_files(&config, files, *algorithm),
    }
}

//! `build` command: run the pipeline and report what it did.

use anyhow::Result;

use crate::{
    cli::BuildArgs,
    config::RevConfig,
    debug, log,
    pipeline::{BuildReport, run_build},
    utils::plural_count,
};

/// Build the configured tree.
///
/// Warnings are always printed; `--quiet` hides progress and the summary.
pub fn build_assets(config: &RevConfig, args: &BuildArgs) -> Result<()> {
    let report = run_build(config, !args.quiet)?;

    for warning in &report.warnings {
        log!("warning"; "{}", warning);
    }
    if !args.quiet {
        log_summary(config, &report);
    }
    Ok(())
}

fn log_summary(config: &RevConfig, report: &BuildReport) {
    let summary = &report.fingerprint;
    if summary.reused + summary.unchanged > 0 {
        debug!(
            "build";
            "{} reused, {} left unchanged",
            plural_count(summary.reused, "mapping"),
            plural_count(summary.unchanged, "file")
        );
    }

    if let Some(path) = &report.asset_map {
        log!("manifest"; "{}", path);
    }
    if let Some(path) = &report.manifest {
        log!("manifest"; "{}", path);
    }

    log!(
        "build";
        "{} fingerprinted, {} copied, {} rewritten into {}",
        plural_count(summary.fingerprinted, "file"),
        plural_count(summary.copied, "file"),
        plural_count(report.rewritten, "file"),
        config.build.output.display()
    );
}

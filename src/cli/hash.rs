//! `hash` command: preview fingerprinted names without building.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    config::RevConfig,
    fingerprint::{ContentHasher, HashAlgorithm, HashPolicy, fingerprinted_path},
};

/// Print `<file> -> <fingerprinted name>` for every file.
pub fn hash_files(
    config: &RevConfig,
    files: &[impl AsRef<Path>],
    algorithm: Option<HashAlgorithm>,
) -> Result<()> {
    let policy = match algorithm {
        Some(algorithm) => HashPolicy::Default(algorithm),
        None => config.hash_policy()?,
    };
    let hasher = ContentHasher::new(policy);

    for file in files {
        let file = file.as_ref();
        println!("{} -> {}", file.display(), fingerprinted_name(&hasher, file)?);
    }
    Ok(())
}

/// File name `path` would receive under `hasher`.
fn fingerprinted_name(hasher: &ContentHasher, path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("`{}` has no UTF-8 file name", path.display()))?;

    let bytes = if hasher.reads_content() {
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        Vec::new()
    };

    Ok(match hasher.digest(&bytes)? {
        Some(digest) => fingerprinted_path(name, &digest),
        None => name.to_string(),
    })
}

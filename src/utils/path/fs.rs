//! Filesystem path helpers.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `collect_files` - every file under a tree as sorted relative paths
//! - `relative_key` - `/`-separated relative path used as a mapping key
//! - `write_file` / `copy_file` - writes that create parent directories

use std::io;
use std::path::{Component, Path, PathBuf};

use jwalk::WalkDir;

use crate::error::{IoResultExt, Result, RevError};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render `path` relative to `root` with `/` separators.
///
/// Returns `None` for paths outside `root` or with non-UTF-8 components.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts.join("/"))
}

/// Collect every file under `root` as sorted relative keys.
///
/// Sorting keeps stage output and logs deterministic across runs.
pub fn collect_files(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(RevError::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).skip_hidden(false) {
        let entry = entry.map_err(|err| {
            let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            RevError::io(path, io::Error::other(err.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let key = relative_key(root, &path).ok_or_else(|| {
            RevError::io(
                &path,
                io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            )
        })?;
        files.push(key);
    }
    files.sort();
    Ok(files)
}

/// Join a `/`-separated key onto a root directory.
pub fn join_key(root: &Path, key: &str) -> PathBuf {
    key.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
}

/// Write `bytes` to `path`, creating parent directories.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).at(parent)?;
    }
    std::fs::write(path, bytes).at(path)
}

/// Copy `source` to `dest`, creating parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).at(parent)?;
    }
    std::fs::copy(source, dest).at(source).map(|_| ())
}

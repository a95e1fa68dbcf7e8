//! Configuration section definitions.
//!
//! Each module corresponds to a section in `asset-rev.toml`:
//!
//! | Module        | TOML Section               | Purpose                        |
//! |---------------|----------------------------|--------------------------------|
//! | `build`       | `[build]`                  | Input/output trees, passes     |
//! | `fingerprint` | `[fingerprint]`            | Eligibility and hash policy    |
//! | `rewrite`     | `[rewrite]`                | Reference rewriting, prepend   |
//! | `manifest`    | `[asset_map]`, `[manifest]`| Emitted mapping documents      |

mod build;
mod fingerprint;
mod manifest;
mod rewrite;

pub use build::BuildSectionConfig;
pub use fingerprint::FingerprintConfig;
pub use manifest::{AssetMapConfig, ManifestConfig};
pub use rewrite::RewriteConfig;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::fingerprint::ExcludePattern;

/// Extensions are bare suffixes such as `js`, never `.js` or `a/b`.
fn validate_extensions(field: FieldPath, extensions: &[String], diag: &mut ConfigDiagnostics) {
    for ext in extensions {
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            diag.error_with_hint(
                field,
                format!("invalid extension `{ext}`"),
                format!("write `{}`", ext.trim_start_matches('.')),
            );
        }
    }
}

fn validate_patterns(field: FieldPath, patterns: &[String], diag: &mut ConfigDiagnostics) {
    for pattern in patterns {
        if pattern.is_empty() {
            diag.error(field, "empty pattern would match every path");
        } else if let Err(err) = ExcludePattern::parse(pattern) {
            diag.error(field, err.to_string());
        }
    }
}

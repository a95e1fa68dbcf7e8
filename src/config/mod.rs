//! Build configuration for `asset-rev.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build        # [build]
//! │   ├── fingerprint  # [fingerprint]
//! │   ├── rewrite      # [rewrite]
//! │   └── manifest     # [asset_map], [manifest]
//! ├── types/         # ConfigError, diagnostics, field paths
//! └── mod.rs         # RevConfig (this file)
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration. CLI flags override file values.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    AssetMapConfig, BuildSectionConfig, FingerprintConfig, ManifestConfig, RewriteConfig,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath, fields};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug,
    fingerprint::{FileFilter, HashPolicy},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing asset-rev.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root; relative paths resolve against it
    #[serde(skip)]
    pub root: PathBuf,

    /// Programmatic digest function, set through [`RevConfig::with_custom_hash`]
    #[serde(skip)]
    custom_hash: Option<HashPolicy>,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    #[serde(default)]
    pub rewrite: RewriteConfig,

    #[serde(default)]
    pub asset_map: AssetMapConfig,

    #[serde(default)]
    pub manifest: ManifestConfig,
}

impl RevConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing file means
    /// defaults, rooted at cwd. Only `build` validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = crate::utils::path::normalize_path(&path);
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        if let Commands::Build { build_args } = &cli.command {
            config.apply_build_args(build_args);
        }

        let root = config.root.clone();
        config.normalize_paths(&root);
        if cli.is_build() {
            config.validate()?;
        }
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} ignored: {}", display_path, fields.join(", "));
    }

    /// Set the project root and resolve the build directories against it.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        self.normalize_paths(&root);
        self
    }

    /// Use `f` to compute digests instead of a built-in algorithm.
    ///
    /// `f` must return a non-empty string without path separators.
    pub fn with_custom_hash(mut self, f: impl Fn(&[u8]) -> String + Send + Sync + 'static) -> Self {
        self.custom_hash = Some(HashPolicy::custom(f));
        self
    }

    /// Effective hash policy after resolving every override form.
    pub fn hash_policy(&self) -> Result<HashPolicy, ConfigError> {
        self.fingerprint.hash_policy(self.custom_hash.as_ref())
    }

    pub fn fingerprint_filter(&self) -> Result<FileFilter, ConfigError> {
        self.fingerprint.filter()
    }

    pub fn rewrite_filter(&self) -> Result<FileFilter, ConfigError> {
        self.rewrite.filter()
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI.
    pub fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.build.input, args.input.as_ref());
        Self::update_option(&mut self.build.output, args.output.as_ref());
        Self::update_option(&mut self.rewrite.prepend, args.prepend.as_ref());
        Self::update_option(&mut self.build.two_pass, args.two_pass.as_ref());
        Self::update_option(&mut self.asset_map.enable, args.asset_map.as_ref());
        Self::update_option(&mut self.manifest.enable, args.manifest.as_ref());
        self.build.clean |= args.clean;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.build.normalize_paths(&root);
        self.build.input = crate::utils::path::normalize_path(&self.build.input);
        self.build.output = crate::utils::path::normalize_path(&self.build.output);
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every error at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.fingerprint
            .validate(self.custom_hash.as_ref(), &mut diag);
        self.rewrite.validate(&mut diag);
        self.asset_map.validate(&mut diag);
        self.manifest.validate(&mut diag);

        diag.into_result()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> RevConfig {
    let (parsed, ignored) = RevConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

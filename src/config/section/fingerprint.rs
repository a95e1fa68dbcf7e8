//! `[fingerprint]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [fingerprint]
//! extensions = ["js", "css", "png", "jpg", "gif", "woff2"]
//! exclude = ["vendor/", "fonts/*.woff"]
//! algorithm = "blake3"   # or: fixed = "v2" / disabled = true
//! ```
//!
//! At most one hash override form may be set: `algorithm`, `fixed`,
//! `disabled`, or a programmatic custom function.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, ConfigError, fields};
use crate::fingerprint::{ExcludePattern, FileFilter, HashAlgorithm, HashPolicy};

use super::{validate_extensions, validate_patterns};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Extensions eligible for fingerprinting (without the dot).
    pub extensions: Vec<String>,

    /// Substring or glob fragments; a matching path is never fingerprinted.
    pub exclude: Vec<String>,

    /// Built-in digest algorithm (md5 when unset).
    pub algorithm: Option<HashAlgorithm>,

    /// Literal digest used for every file instead of hashing.
    /// An empty string keeps original names while still recording them.
    pub fixed: Option<String>,

    /// Skip fingerprinting entirely.
    pub disabled: bool,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            extensions: ["js", "css", "png", "jpg", "gif"]
                .map(String::from)
                .to_vec(),
            exclude: Vec::new(),
            algorithm: None,
            fixed: None,
            disabled: false,
        }
    }
}

impl FingerprintConfig {
    /// Resolve the hash policy, or report conflicting override forms.
    ///
    /// `custom` is a programmatic custom function, which counts as one form.
    pub fn hash_policy(&self, custom: Option<&HashPolicy>) -> Result<HashPolicy, ConfigError> {
        let mut forms = Vec::new();
        if self.algorithm.is_some() {
            forms.push("algorithm");
        }
        if self.fixed.is_some() {
            forms.push("fixed");
        }
        if self.disabled {
            forms.push("disabled");
        }
        if custom.is_some() {
            forms.push("custom function");
        }
        if forms.len() > 1 {
            return Err(ConfigError::Validation(format!(
                "conflicting hash overrides: {}",
                forms.join(", ")
            )));
        }

        let policy = match (custom, &self.fixed, self.algorithm) {
            (Some(custom), _, _) => custom.clone(),
            _ if self.disabled => HashPolicy::Disabled,
            (None, Some(fixed), _) => HashPolicy::Fixed(fixed.clone()),
            (None, None, algorithm) => HashPolicy::Default(algorithm.unwrap_or_default()),
        };
        Ok(policy)
    }

    pub fn filter(&self) -> Result<FileFilter, ConfigError> {
        FileFilter::new(self.extensions.iter().cloned(), &self.exclude)
    }

    pub fn validate(&self, custom: Option<&HashPolicy>, diag: &mut ConfigDiagnostics) {
        if let Err(err) = self.hash_policy(custom) {
            diag.error_with_hint(
                fields::FINGERPRINT_HASH,
                err.to_string(),
                "set only one of `algorithm`, `fixed` or `disabled`",
            );
        }

        if let Some(fixed) = &self.fixed
            && fixed.contains(['/', '\\'])
        {
            diag.error(
                fields::FINGERPRINT_FIXED,
                format!("fixed digest `{fixed}` must not contain path separators"),
            );
        }

        if self.extensions.is_empty() && !self.disabled {
            diag.error_with_hint(
                fields::FINGERPRINT_EXTENSIONS,
                "no extensions to fingerprint",
                "list extensions such as [\"js\", \"css\"], or set disabled = true",
            );
        }
        validate_extensions(fields::FINGERPRINT_EXTENSIONS, &self.extensions, diag);
        validate_patterns(fields::FINGERPRINT_EXCLUDE, &self.exclude, diag);
    }

    /// Whether a fingerprint exclusion names `path`.
    pub fn excludes(&self, path: &str) -> bool {
        self.exclude
            .iter()
            .filter_map(|p| ExcludePattern::parse(p).ok())
            .any(|p| p.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_md5() {
        let config = FingerprintConfig::default();
        assert!(matches!(
            config.hash_policy(None).unwrap(),
            HashPolicy::Default(HashAlgorithm::Md5)
        ));
    }

    #[test]
    fn test_policy_forms() {
        let config = FingerprintConfig {
            fixed: Some("test".into()),
            ..Default::default()
        };
        assert!(matches!(config.hash_policy(None).unwrap(), HashPolicy::Fixed(s) if s == "test"));

        let config = FingerprintConfig {
            disabled: true,
            ..Default::default()
        };
        assert!(config.hash_policy(None).unwrap().is_disabled());

        let custom = HashPolicy::custom(|_| "x".into());
        let config = FingerprintConfig::default();
        assert!(matches!(
            config.hash_policy(Some(&custom)).unwrap(),
            HashPolicy::Custom(_)
        ));
    }

    #[test]
    fn test_conflicting_forms() {
        let config = FingerprintConfig {
            fixed: Some("a".into()),
            disabled: true,
            ..Default::default()
        };
        let err = config.hash_policy(None).unwrap_err();
        assert!(err.to_string().contains("fixed, disabled"));

        let config = FingerprintConfig {
            algorithm: Some(HashAlgorithm::Blake3),
            ..Default::default()
        };
        let custom = HashPolicy::custom(|_| "x".into());
        assert!(config.hash_policy(Some(&custom)).is_err());
    }

    #[test]
    fn test_validate_empty_extensions() {
        let config = FingerprintConfig {
            extensions: vec![],
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(None, &mut diag);
        assert!(diag.mentions(fields::FINGERPRINT_EXTENSIONS));

        // Allowed when hashing is disabled anyway
        let config = FingerprintConfig {
            extensions: vec![],
            disabled: true,
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(None, &mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_validate_fixed_separator() {
        let config = FingerprintConfig {
            fixed: Some("a/b".into()),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(None, &mut diag);
        assert!(diag.mentions(fields::FINGERPRINT_FIXED));
    }

    #[test]
    fn test_excludes() {
        let config = FingerprintConfig {
            exclude: vec!["manifest.json".into(), "maps/*.map".into()],
            ..Default::default()
        };
        assert!(config.excludes("assets/manifest.json"));
        assert!(config.excludes("assets/maps/app.map"));
        assert!(!config.excludes("assets/assetMap.json"));
    }
}

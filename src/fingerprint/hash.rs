//! Content digests for fingerprinting.
//!
//! A [`HashPolicy`] is resolved once from configuration and wrapped in a
//! [`ContentHasher`] that every stage shares read-only.
//!
//! | Policy      | Digest                          | Effect on path          |
//! |-------------|---------------------------------|-------------------------|
//! | `Default`   | md5 (or blake3), lowercase hex  | `app.js` → `app-<hex>.js` |
//! | `Fixed(s)`  | `s` verbatim, content unread    | `app.js` → `app-s.js`     |
//! | `Fixed("")` | empty                           | path retained, still mapped |
//! | `Disabled`  | none                            | path retained, not mapped |
//! | `Custom(f)` | `f(bytes)`                      | `app.js` → `app-f.js`     |

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Built-in digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// 128-bit md5, 32 hex chars.
    #[default]
    Md5,
    /// 256-bit blake3, 64 hex chars.
    Blake3,
}

impl HashAlgorithm {
    /// Digest bytes as lowercase hex.
    pub fn hex(self, bytes: &[u8]) -> String {
        match self {
            Self::Md5 => hex::encode(Md5::digest(bytes)),
            Self::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

/// Caller-supplied digest function.
pub type CustomHashFn = dyn Fn(&[u8]) -> String + Send + Sync;

/// How digests are produced for a build.
#[derive(Clone)]
pub enum HashPolicy {
    /// Hash content with the given algorithm.
    Default(HashAlgorithm),
    /// Use a literal digest; content is never read for hashing.
    Fixed(String),
    /// Skip fingerprinting: paths stay unchanged and nothing is mapped.
    Disabled,
    /// Hash content with a caller-supplied function.
    Custom(Arc<CustomHashFn>),
}

impl HashPolicy {
    /// Default md5 policy.
    pub const fn md5() -> Self {
        Self::Default(HashAlgorithm::Md5)
    }

    /// Wrap a closure as a custom policy.
    pub fn custom(f: impl Fn(&[u8]) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self::md5()
    }
}

impl fmt::Debug for HashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(algorithm) => f.debug_tuple("Default").field(algorithm).finish(),
            Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Self::Disabled => f.write_str("Disabled"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Computes digests according to a [`HashPolicy`].
#[derive(Debug, Clone)]
pub struct ContentHasher {
    policy: HashPolicy,
}

impl ContentHasher {
    pub const fn new(policy: HashPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> &HashPolicy {
        &self.policy
    }

    /// Whether the policy needs file content at all.
    pub const fn reads_content(&self) -> bool {
        matches!(self.policy, HashPolicy::Default(_) | HashPolicy::Custom(_))
    }

    /// Compute the digest for `bytes`.
    ///
    /// Returns `Ok(None)` when fingerprinting is disabled. A custom function
    /// producing something that cannot live inside a file name is a
    /// configuration error.
    pub fn digest(&self, bytes: &[u8]) -> Result<Option<String>, ConfigError> {
        match &self.policy {
            HashPolicy::Disabled => Ok(None),
            HashPolicy::Fixed(value) => Ok(Some(value.clone())),
            HashPolicy::Default(algorithm) => Ok(Some(algorithm.hex(bytes))),
            HashPolicy::Custom(f) => {
                let digest = f(bytes);
                if digest.is_empty() || digest.contains(['/', '\\']) {
                    return Err(ConfigError::Validation(format!(
                        "custom hash returned an unusable digest: {digest:?}"
                    )));
                }
                Ok(Some(digest))
            }
        }
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(HashPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_md5_is_32_lowercase_hex() {
        let hasher = ContentHasher::default();
        let digest = hasher.digest(b"body { color: red; }").unwrap().unwrap();
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_md5_known_value() {
        let digest = HashAlgorithm::Md5.hex(b"hello world");
        assert_eq!(digest, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_digest_is_deterministic() {
        let hasher = ContentHasher::default();
        let a = hasher.digest(b"same bytes").unwrap();
        let b = hasher.digest(b"same bytes").unwrap();
        let c = hasher.digest(b"other bytes").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_blake3_length() {
        let hasher = ContentHasher::new(HashPolicy::Default(HashAlgorithm::Blake3));
        let digest = hasher.digest(b"console.log(1)").unwrap().unwrap();
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_fixed_ignores_content() {
        let hasher = ContentHasher::new(HashPolicy::Fixed("test".into()));
        assert!(!hasher.reads_content());
        assert_eq!(hasher.digest(b"a").unwrap().as_deref(), Some("test"));
        assert_eq!(hasher.digest(b"b").unwrap().as_deref(), Some("test"));
    }

    #[test]
    fn test_disabled_yields_none() {
        let hasher = ContentHasher::new(HashPolicy::Disabled);
        assert_eq!(hasher.digest(b"anything").unwrap(), None);
    }

    #[test]
    fn test_custom_function() {
        let hasher = ContentHasher::new(HashPolicy::custom(|bytes| {
            HashAlgorithm::Blake3.hex(bytes)[..40].to_string()
        }));
        let digest = hasher.digest(b"160 bits").unwrap().unwrap();
        assert_eq!(digest.len(), 40);
    }

    #[test]
    fn test_custom_rejects_path_separators() {
        let hasher = ContentHasher::new(HashPolicy::custom(|_| "a/b".to_string()));
        assert!(hasher.digest(b"x").is_err());

        let hasher = ContentHasher::new(HashPolicy::custom(|_| String::new()));
        assert!(hasher.digest(b"x").is_err());
    }

    #[test]
    fn test_policy_debug() {
        assert_eq!(format!("{:?}", HashPolicy::custom(|_| "x".into())), "Custom(..)");
        assert_eq!(format!("{:?}", HashPolicy::md5()), "Default(Md5)");
    }
}

//! Fingerprinted path derivation.

use crate::error::{Result, RevError};

use super::{AssetMapping, ContentHasher, Resolved};

/// Insert `-<digest>` before the last extension of the file name.
///
/// `assets/app.js` + `abc123` → `assets/app-abc123.js`. Dots in directory
/// names are ignored; a name without an extension gets the suffix appended.
/// An empty digest leaves the path unchanged.
pub fn fingerprinted_path(path: &str, digest: &str) -> String {
    if digest.is_empty() {
        return path.to_string();
    }

    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        // Leading dot is a hidden file, not an extension
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            format!("{}-{}{}", &path[..dot], digest, &path[dot..])
        }
        _ => format!("{path}-{digest}"),
    }
}

/// Extension of the final path segment (text after the last `.`).
pub fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(&name[dot + 1..]),
        _ => None,
    }
}

/// Derives fingerprinted paths and records them in the shared mapping.
#[derive(Debug, Clone, Copy)]
pub struct PathFingerprinter<'a> {
    hasher: &'a ContentHasher,
    mapping: &'a AssetMapping,
}

impl<'a> PathFingerprinter<'a> {
    pub const fn new(hasher: &'a ContentHasher, mapping: &'a AssetMapping) -> Self {
        Self { hasher, mapping }
    }

    pub const fn hasher(&self) -> &'a ContentHasher {
        self.hasher
    }

    pub const fn mapping(&self) -> &'a AssetMapping {
        self.mapping
    }

    /// Fingerprint `path`, reusing an earlier mapping when one exists.
    ///
    /// `content` is only called when a digest actually has to be computed.
    /// Returns `None` when hashing is disabled: the path keeps its name and
    /// nothing is recorded.
    pub fn fingerprint<B, C>(&self, path: &str, content: C) -> Result<Option<Resolved>>
    where
        B: AsRef<[u8]>,
        C: FnOnce() -> Result<B>,
    {
        if self.hasher.policy().is_disabled() {
            return Ok(None);
        }

        self.mapping
            .resolve_or_insert_with::<RevError>(path, || {
                let digest = if self.hasher.reads_content() {
                    self.hasher.digest(content()?.as_ref())?
                } else {
                    self.hasher.digest(&[])?
                };
                Ok(fingerprinted_path(path, &digest.unwrap_or_default()))
            })
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::HashPolicy;
    use std::cell::Cell;

    #[test]
    fn test_fingerprinted_path_basic() {
        assert_eq!(fingerprinted_path("app.js", "abc123"), "app-abc123.js");
        assert_eq!(
            fingerprinted_path("assets/images/logo.png", "ff"),
            "assets/images/logo-ff.png"
        );
    }

    #[test]
    fn test_fingerprinted_path_last_extension_only() {
        assert_eq!(fingerprinted_path("vendor.min.js", "ab"), "vendor.min-ab.js");
        assert_eq!(fingerprinted_path("app.js.map", "ab"), "app.js-ab.map");
    }

    #[test]
    fn test_fingerprinted_path_dotted_directory() {
        assert_eq!(fingerprinted_path("v1.2/LICENSE", "ab"), "v1.2/LICENSE-ab");
        assert_eq!(fingerprinted_path("dir/.hidden", "ab"), "dir/.hidden-ab");
    }

    #[test]
    fn test_fingerprinted_path_empty_digest() {
        assert_eq!(fingerprinted_path("app.js", ""), "app.js");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("assets/app.js"), Some("js"));
        assert_eq!(extension("a.b/c.tar.gz"), Some("gz"));
        assert_eq!(extension("a.b/Makefile"), None);
        assert_eq!(extension(".gitignore"), None);
        assert_eq!(extension("trailing."), None);
    }

    #[test]
    fn test_fingerprint_records_and_reuses() {
        let hasher = ContentHasher::default();
        let mapping = AssetMapping::new();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let first = fp
            .fingerprint("app.js", || Ok(b"one".to_vec()))
            .unwrap()
            .unwrap();
        assert!(!first.is_existing());
        assert!(first.path().starts_with("app-"));

        // Content changed, but the earlier mapping wins without re-reading
        let read = Cell::new(false);
        let second = fp
            .fingerprint("app.js", || {
                read.set(true);
                Ok(b"two".to_vec())
            })
            .unwrap()
            .unwrap();
        assert!(second.is_existing());
        assert_eq!(first.path(), second.path());
        assert!(!read.get());
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_fingerprint_same_content_same_name() {
        let hasher = ContentHasher::default();
        let mapping = AssetMapping::new();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let a = fp.fingerprint("a/x.css", || Ok(b"same".to_vec())).unwrap().unwrap();
        let b = fp.fingerprint("b/x.css", || Ok(b"same".to_vec())).unwrap().unwrap();
        let digest_a = a.path().trim_start_matches("a/");
        let digest_b = b.path().trim_start_matches("b/");
        assert_eq!(digest_a, digest_b);
    }

    #[test]
    fn test_fingerprint_disabled() {
        let hasher = ContentHasher::new(HashPolicy::Disabled);
        let mapping = AssetMapping::new();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        assert!(fp.fingerprint("app.js", || Ok(Vec::<u8>::new())).unwrap().is_none());
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_fingerprint_fixed_skips_content() {
        let hasher = ContentHasher::new(HashPolicy::Fixed("test".into()));
        let mapping = AssetMapping::new();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let resolved = fp
            .fingerprint("app.js", || -> Result<Vec<u8>> { panic!("content must not be read") })
            .unwrap()
            .unwrap();
        assert_eq!(resolved.path(), "app-test.js");
    }

    #[test]
    fn test_fingerprint_fixed_empty_keeps_name() {
        let hasher = ContentHasher::new(HashPolicy::Fixed(String::new()));
        let mapping = AssetMapping::new();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let resolved = fp.fingerprint("app.js", || Ok(Vec::<u8>::new())).unwrap().unwrap();
        assert_eq!(resolved.path(), "app.js");
        assert_eq!(mapping.get("app.js").as_deref(), Some("app.js"));
    }
}

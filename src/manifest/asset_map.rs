//! `{"assets": {...}, "prepend": "..."}` document.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint::PathFingerprinter;
use crate::utils::path::{join_key, write_file};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMapDocument {
    pub assets: BTreeMap<String, String>,
    pub prepend: String,
}

/// Write the asset map under `output` at the relative `path`.
///
/// The document is built from the mapping as it stands. With `fingerprint`
/// set the file is then fingerprinted like any other asset, so its own
/// entry lands in the mapping but never in its own content.
///
/// Returns the relative path actually written.
pub fn write_asset_map(
    output: &Path,
    path: &str,
    prepend: &str,
    fingerprinter: PathFingerprinter<'_>,
    fingerprint: bool,
) -> Result<String> {
    let document = AssetMapDocument {
        assets: fingerprinter.mapping().snapshot(),
        prepend: prepend.to_string(),
    };
    let bytes = serde_json::to_vec(&document)?;

    let written = if fingerprint {
        fingerprinter
            .fingerprint(path, || Ok(bytes.as_slice()))?
            .map_or_else(|| path.to_string(), |resolved| resolved.into_path())
    } else {
        path.to_string()
    };

    write_file(&join_key(output, &written), &bytes)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{AssetMapping, ContentHasher, HashPolicy};
    use std::fs;
    use tempfile::TempDir;

    fn seeded_mapping() -> AssetMapping {
        let mapping = AssetMapping::new();
        mapping
            .resolve_or_insert_with::<()>("app.js", || Ok("app-1.js".into()))
            .unwrap();
        mapping
    }

    fn read(dir: &Path, key: &str) -> AssetMapDocument {
        serde_json::from_slice(&fs::read(join_key(dir, key)).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_asset_map() {
        let dir = TempDir::new().unwrap();
        let hasher = ContentHasher::default();
        let mapping = seeded_mapping();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let written = write_asset_map(dir.path(), "assets/assetMap.json", "/cdn/", fp, false).unwrap();
        assert_eq!(written, "assets/assetMap.json");

        let doc = read(dir.path(), &written);
        assert_eq!(doc.prepend, "/cdn/");
        assert_eq!(doc.assets.len(), 1);
        assert_eq!(doc.assets["app.js"], "app-1.js");
        assert!(!mapping.contains("assets/assetMap.json"));
    }

    #[test]
    fn test_fingerprinted_asset_map_excludes_itself() {
        let dir = TempDir::new().unwrap();
        let hasher = ContentHasher::new(HashPolicy::Fixed("v2".into()));
        let mapping = seeded_mapping();
        let fp = PathFingerprinter::new(&hasher, &mapping);

        let written = write_asset_map(dir.path(), "assets/assetMap.json", "", fp, true).unwrap();
        assert_eq!(written, "assets/assetMap-v2.json");
        assert_eq!(
            mapping.get("assets/assetMap.json").as_deref(),
            Some("assets/assetMap-v2.json")
        );

        let doc = read(dir.path(), &written);
        assert!(!doc.assets.contains_key("assets/assetMap.json"));
        assert!(!dir.path().join("assets/assetMap.json").exists());
    }

    #[test]
    fn test_wire_format() {
        let doc = AssetMapDocument {
            assets: [("a.css".to_string(), "a-1.css".to_string())].into(),
            prepend: String::new(),
        };
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"assets":{"a.css":"a-1.css"},"prepend":""}"#
        );
    }
}

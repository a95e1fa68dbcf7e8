//! Content fingerprinting.
//!
//! | Module    | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `hash`    | Digest policy and computation                    |
//! | `path`    | `app.js` → `app-<digest>.js`, mapping recording  |
//! | `mapping` | Shared original → fingerprinted table            |
//! | `filter`  | Extension allow-list and exclusion rules         |
//! | `stage`   | Whole-tree fingerprinting                        |

mod filter;
mod hash;
mod mapping;
mod path;
mod stage;

pub use filter::{ExcludePattern, FileFilter};
pub use hash::{ContentHasher, CustomHashFn, HashAlgorithm, HashPolicy};
pub use mapping::{AssetMapping, Resolved};
pub use path::{PathFingerprinter, extension, fingerprinted_path};
pub use stage::{FileRecord, FingerprintStage, FingerprintSummary};

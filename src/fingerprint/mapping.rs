//! Original path → fingerprinted path table.
//!
//! Created empty per build, written only by the fingerprint stage and the
//! manifest writers' own fingerprinting, read by everything else.
//! Entries are insert-once: the first mapping recorded for a path wins for
//! the rest of the build.

use std::collections::BTreeMap;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Thread-safe, insert-once asset mapping.
#[derive(Debug, Default)]
pub struct AssetMapping {
    entries: DashMap<String, String>,
}

/// Outcome of [`AssetMapping::resolve_or_insert_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Freshly computed and recorded.
    Inserted(String),
    /// Already mapped earlier in the build.
    Existing(String),
}

impl Resolved {
    pub fn path(&self) -> &str {
        match self {
            Self::Inserted(path) | Self::Existing(path) => path,
        }
    }

    pub fn into_path(self) -> String {
        match self {
            Self::Inserted(path) | Self::Existing(path) => path,
        }
    }

    pub const fn is_existing(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

impl AssetMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, original: &str) -> Option<String> {
        self.entries.get(original).map(|v| v.clone())
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the existing mapping for `original`, or compute and record one.
    ///
    /// The shard lock is held while `compute` runs, so two workers racing on
    /// the same path never record two different fingerprints.
    pub fn resolve_or_insert_with<E>(
        &self,
        original: &str,
        compute: impl FnOnce() -> Result<String, E>,
    ) -> Result<Resolved, E> {
        match self.entries.entry(original.to_string()) {
            Entry::Occupied(entry) => Ok(Resolved::Existing(entry.get().clone())),
            Entry::Vacant(entry) => {
                let fingerprinted = compute()?;
                entry.insert(fingerprinted.clone());
                Ok(Resolved::Inserted(fingerprinted))
            }
        }
    }

    /// Sorted copy of the table, for serialization and scanning.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

//! The video catalog: an immutable, sorted snapshot of the library built once at startup.

pub mod identifier;
pub mod mime;
pub mod scanner;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub use scanner::{scan, ScanError};

/// A single discovered video file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Stable identifier derived from `relative_path` (see [`identifier::entry_id`]).
    pub id: Uuid,
    /// Path relative to the catalog root, `/`-separated. Used for display and ordering.
    pub relative_path: String,
    /// Filesystem path as walked (root joined with the relative components).
    pub path: PathBuf,
    /// File size at scan time. Not re-validated per request.
    pub size_bytes: u64,
    /// Lowercase extension without the leading dot.
    pub extension: String,
}

/// Ordered, read-only collection of [`CatalogEntry`] with O(1) lookup by id.
///
/// Entries are sorted by `relative_path` case-insensitively, with the exact
/// path as tiebreaker. There is no way to mutate a catalog after construction,
/// so it is shared behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct Catalog {
    root: PathBuf,
    entries: Vec<CatalogEntry>,
    index: HashMap<Uuid, usize>,
}

impl Catalog {
    /// Build a catalog from unordered entries.
    ///
    /// Sorts, then indexes. If two entries hash to the same id the one that
    /// sorts first wins and the other is dropped with a warning.
    pub fn from_entries(root: impl Into<PathBuf>, mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| compare_relative_paths(&a.relative_path, &b.relative_path));

        let mut index = HashMap::with_capacity(entries.len());
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(&existing) = index.get(&entry.id) {
                let existing: &CatalogEntry = &kept[existing];
                tracing::warn!(
                    "Identifier collision: {} and {} both map to {}; keeping the former",
                    existing.relative_path,
                    entry.relative_path,
                    entry.id
                );
                continue;
            }
            index.insert(entry.id, kept.len());
            kept.push(entry);
        }

        Catalog {
            root: root.into(),
            entries: kept,
            index,
        }
    }

    pub fn lookup(&self, id: &Uuid) -> Option<&CatalogEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case-insensitive ordering on relative paths, total thanks to the exact-match tiebreak.
pub fn compare_relative_paths(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

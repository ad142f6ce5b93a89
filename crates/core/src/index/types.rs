//! Title index types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::normalize::normalize;

/// Map from normalized note title to the absolute path of the note.
///
/// Keys are only ever inserted if absent: when two notes share a normalized
/// title, the one registered first keeps the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    entries: HashMap<String, PathBuf>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key -> path` unless `key` is already present.
    /// Returns whether the entry was inserted.
    pub fn insert_if_absent(&mut self, key: String, path: PathBuf) -> bool {
        use std::collections::hash_map::Entry;

        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(path);
                true
            }
            Entry::Occupied(slot) => {
                tracing::debug!(
                    "'{}' shadowed by {}",
                    path.display(),
                    slot.get().display()
                );
                false
            }
        }
    }

    /// Register a note file under the normalized form of its file stem.
    pub fn register(&mut self, path: &Path) -> bool {
        let Some(stem) = path.file_stem() else {
            return false;
        };
        let key = normalize(&stem.to_string_lossy());
        self.insert_if_absent(key, path.to_path_buf())
    }

    /// Look up an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries.get(key).map(PathBuf::as_path)
    }

    /// Look up a raw title, normalizing it first.
    pub fn find_title(&self, title: &str) -> Option<&Path> {
        self.get(&normalize(title))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Run state shared by every walk of one export.

use std::collections::{BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

/// A wikilink that did not resolve to any note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedLink {
    /// Vault-relative path of the note containing the link.
    pub source: String,
    /// The link target as written.
    pub target: String,
}

/// State of one export run.
///
/// `processed` and `copied` only ever grow. A source path is copied at most
/// once and its links are expanded at most once, no matter how many daily
/// notes reach it.
#[derive(Debug)]
pub struct ExportJob {
    vault_root: PathBuf,
    destination: PathBuf,
    processed: HashSet<PathBuf>,
    copied: BTreeSet<PathBuf>,
    unresolved: Vec<UnresolvedLink>,
}

impl ExportJob {
    pub fn new(vault_root: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            destination: destination.into(),
            processed: HashSet::new(),
            copied: BTreeSet::new(),
            unresolved: Vec::new(),
        }
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Source paths copied so far, sorted.
    pub fn copied_files(&self) -> &BTreeSet<PathBuf> {
        &self.copied
    }

    pub fn is_copied(&self, source: &Path) -> bool {
        self.copied.contains(source)
    }

    pub fn is_processed(&self, source: &Path) -> bool {
        self.processed.contains(source)
    }

    pub fn unresolved_links(&self) -> &[UnresolvedLink] {
        &self.unresolved
    }

    /// Mark `source` as visited. Returns false if it already was.
    pub(crate) fn mark_processed(&mut self, source: &Path) -> bool {
        self.processed.insert(source.to_path_buf())
    }

    pub(crate) fn mark_copied(&mut self, source: &Path) {
        self.copied.insert(source.to_path_buf());
    }

    pub(crate) fn record_unresolved(&mut self, source: &Path, target: &str) {
        self.unresolved.push(UnresolvedLink {
            source: self.relative_display(source),
            target: target.to_string(),
        });
    }

    /// Path of `source` relative to the vault root, or its file name when it
    /// lies outside the vault.
    pub fn relative_path(&self, source: &Path) -> PathBuf {
        match source.strip_prefix(&self.vault_root) {
            Ok(relative) => relative
                .components()
                .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
                .collect(),
            Err(_) => source.file_name().map(PathBuf::from).unwrap_or_default(),
        }
    }

    /// Where `source` lands inside the export directory.
    pub fn destination_for(&self, source: &Path) -> PathBuf {
        self.destination.join(self.relative_path(source))
    }

    /// `relative_path` rendered with `/` separators.
    pub fn relative_display(&self, source: &Path) -> String {
        slash_path(&self.relative_path(source))
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

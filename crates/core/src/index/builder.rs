//! Index building orchestration.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::listing::{ListingIndexSource, ListingProvider};
use super::types::FileIndex;
use crate::vault::{VaultFs, VaultWalkerError};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to run listing tool {0}: {1}")]
    ToolSpawn(String, #[source] std::io::Error),

    #[error("listing tool exited with {0}")]
    ToolFailed(String),

    #[error("listing tool produced no output")]
    EmptyListing,

    #[error("listing tool produced malformed JSON: {0}")]
    MalformedListing(#[source] serde_json::Error),

    #[error("Vault walker error: {0}")]
    Walker(#[from] VaultWalkerError),
}

/// A way of enumerating the vault into a [`FileIndex`].
pub trait IndexSource {
    fn name(&self) -> &str;

    fn build(&self, vault_root: &Path) -> Result<FileIndex, IndexError>;
}

/// [`IndexSource`] that walks the vault through a [`VaultFs`].
pub struct TraversalSource<'a> {
    fs: &'a dyn VaultFs,
    excluded: Vec<PathBuf>,
}

impl<'a> TraversalSource<'a> {
    pub fn new(fs: &'a dyn VaultFs, excluded: Vec<PathBuf>) -> Self {
        Self { fs, excluded }
    }
}

impl IndexSource for TraversalSource<'_> {
    fn name(&self) -> &str {
        "traversal"
    }

    fn build(&self, vault_root: &Path) -> Result<FileIndex, IndexError> {
        let mut index = FileIndex::new();
        for file in self.fs.note_files(vault_root, &self.excluded)? {
            index.register(&file.absolute_path);
        }
        Ok(index)
    }
}

/// The outcome of building an index.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub index: FileIndex,
    /// Whether the external listing tool produced the index.
    pub used_listing_tool: bool,
    /// Indexing duration in milliseconds.
    pub duration_ms: u64,
}

/// Builder for the vault title index.
///
/// Tries the listing tool first when one is configured, and falls back to a
/// traversal through the [`VaultFs`] if the tool fails in any way.
pub struct IndexBuilder<'a> {
    fs: &'a dyn VaultFs,
    vault_root: &'a Path,
    excluded: Vec<PathBuf>,
    listing: Option<Box<dyn ListingProvider + 'a>>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(fs: &'a dyn VaultFs, vault_root: &'a Path) -> Self {
        Self { fs, vault_root, excluded: Vec::new(), listing: None }
    }

    /// Absolute paths whose notes must not be indexed.
    pub fn with_exclusions(mut self, excluded: Vec<PathBuf>) -> Self {
        self.excluded = excluded;
        self
    }

    pub fn with_listing(mut self, provider: impl ListingProvider + 'a) -> Self {
        self.listing = Some(Box::new(provider));
        self
    }

    pub fn build(self) -> Result<BuiltIndex, IndexError> {
        let start = std::time::Instant::now();

        if let Some(provider) = self.listing {
            let tool = provider.name().to_string();
            let source = ListingIndexSource::new(provider, self.excluded.clone());
            match source.build(self.vault_root) {
                Ok(index) => {
                    tracing::debug!("indexed {} notes with {}", index.len(), tool);
                    return Ok(BuiltIndex {
                        index,
                        used_listing_tool: true,
                        duration_ms: start.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    tracing::warn!("{} listing unusable, falling back to traversal: {}", tool, e);
                }
            }
        }

        let index = TraversalSource::new(self.fs, self.excluded).build(self.vault_root)?;
        tracing::debug!("indexed {} notes by traversal", index.len());

        Ok(BuiltIndex {
            index,
            used_listing_tool: false,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl<P: ListingProvider + ?Sized> ListingProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn listing(&self, root: &Path) -> Result<String, IndexError> {
        (**self).listing(root)
    }
}

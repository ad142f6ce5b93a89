//! Bounded link-following copy of notes into the export directory.

use std::path::Path;

use super::ExportError;
use super::job::ExportJob;
use crate::NOTE_EXTENSION;
use crate::index::FileIndex;
use crate::normalize::normalize;
use crate::vault::{VaultFs, extract_links};

/// Default number of link hops followed from each daily note.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Depth-first walker copying a note and, recursively, every note it links to.
pub struct ExportWalker<'a> {
    fs: &'a dyn VaultFs,
    index: &'a FileIndex,
    max_depth: usize,
}

impl<'a> ExportWalker<'a> {
    pub fn new(fs: &'a dyn VaultFs, index: &'a FileIndex) -> Self {
        Self { fs, index, max_depth: DEFAULT_MAX_DEPTH }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Export `path`, found `depth` hops away from a daily note.
    ///
    /// Paths beyond the depth bound, missing on disk, or already visited in
    /// this job are silently skipped. Copy and read failures are fatal.
    pub fn walk(&self, job: &mut ExportJob, path: &Path, depth: usize) -> Result<(), ExportError> {
        if depth > self.max_depth {
            return Ok(());
        }
        if !self.fs.is_file(path) {
            tracing::debug!("skipping missing note {}", path.display());
            return Ok(());
        }
        if !job.mark_processed(path) {
            return Ok(());
        }

        self.copy_note(job, path)?;

        let bytes = self
            .fs
            .read(path)
            .map_err(|source| ExportError::Read { path: path.to_path_buf(), source })?;
        let content = String::from_utf8_lossy(&bytes);

        for link in extract_links(&content) {
            match self.find_file_for_link(&link) {
                Some(target) if self.fs.is_file(target) => {
                    if depth + 1 > self.max_depth {
                        tracing::debug!("depth limit reached at [[{}]] in {}", link, path.display());
                    }
                    self.walk(job, target, depth + 1)?;
                }
                _ => {
                    tracing::info!("link not found: [[{}]] in {}", link, path.display());
                    job.record_unresolved(path, &link);
                }
            }
        }

        Ok(())
    }

    /// Resolve a wikilink target through the title index.
    ///
    /// Only the last `/`-separated segment is looked up, with a trailing note
    /// extension removed.
    pub fn find_file_for_link(&self, link: &str) -> Option<&'a Path> {
        let name = link.rsplit('/').next().unwrap_or(link);
        let name = name
            .strip_suffix(&format!(".{NOTE_EXTENSION}"))
            .unwrap_or(name);
        self.index.get(&normalize(name))
    }

    fn copy_note(&self, job: &mut ExportJob, source: &Path) -> Result<(), ExportError> {
        if job.is_copied(source) {
            return Ok(());
        }

        let dest = job.destination_for(source);
        if let Some(parent) = dest.parent() {
            self.fs
                .create_dir_all(parent)
                .map_err(|e| ExportError::CreateDir { path: parent.to_path_buf(), source: e })?;
        }
        self.fs.copy(source, &dest).map_err(|e| ExportError::Copy {
            from: source.to_path_buf(),
            to: dest.clone(),
            source: e,
        })?;

        tracing::debug!("copied {} -> {}", source.display(), dest.display());
        job.mark_copied(source);
        Ok(())
    }
}

//! Filesystem capability surface.
//!
//! Export stages never call `std::fs` directly; they go through [`VaultFs`] so
//! the whole pipeline can run against [`MemoryFs`] in tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use super::walker::{VaultWalker, VaultWalkerError, WalkedFile, is_hidden, is_note_file};

/// The filesystem operations the exporter needs.
pub trait VaultFs {
    /// Whether `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Size of the file at `path` in bytes.
    fn size(&self, path: &Path) -> io::Result<u64>;

    /// Resolve `path` to the form used for every path handed out by this
    /// filesystem (symlinks resolved on disk, unchanged in memory).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Immediate subdirectories of `path`, sorted.
    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// All note files under `root`, skipping hidden entries and anything under
    /// `excluded`, in component-wise lexicographic order of their relative path.
    fn note_files(
        &self,
        root: &Path,
        excluded: &[PathBuf],
    ) -> Result<Vec<WalkedFile>, VaultWalkerError>;

    /// Whether this filesystem is the real disk, so external tools see the
    /// same tree.
    fn is_physical(&self) -> bool {
        false
    }
}

/// [`VaultFs`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl VaultFs for RealFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::copy(from, to).map(|_| ())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|m| m.len())
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        path.canonicalize()
    }

    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn note_files(
        &self,
        root: &Path,
        excluded: &[PathBuf],
    ) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        VaultWalker::with_exclusions(root, excluded.to_vec())?.walk()
    }

    fn is_physical(&self) -> bool {
        true
    }
}

/// In-memory [`VaultFs`] for tests.
///
/// Directories are implied by the files beneath them and by explicit
/// `create_dir_all` calls. Every write and copy is counted per destination.
#[derive(Debug, Default)]
pub struct MemoryFs {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: RefCell<BTreeSet<PathBuf>>,
    writes: RefCell<HashMap<PathBuf, usize>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file, creating its parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dirs(parent);
        }
        self.files.borrow_mut().insert(path.to_path_buf(), contents.as_ref().to_vec());
    }

    /// Contents of a file as UTF-8, if it exists.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .borrow()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// How many times `path` was written or copied to.
    pub fn write_count(&self, path: impl AsRef<Path>) -> usize {
        self.writes.borrow().get(path.as_ref()).copied().unwrap_or(0)
    }

    /// Every file currently stored under `root`.
    pub fn files_under(&self, root: impl AsRef<Path>) -> Vec<PathBuf> {
        let root = root.as_ref();
        self.files.borrow().keys().filter(|p| p.starts_with(root)).cloned().collect()
    }

    fn add_dirs(&self, dir: &Path) {
        let mut dirs = self.dirs.borrow_mut();
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn record_write(&self, path: &Path) {
        *self.writes.borrow_mut().entry(path.to_path_buf()).or_default() += 1;
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
}

impl VaultFs for MemoryFs {
    fn is_file(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.borrow().contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files.borrow().get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => {
                return Err(not_found(parent));
            }
            _ => {}
        }
        self.files.borrow_mut().insert(path.to_path_buf(), contents.to_vec());
        self.record_write(path);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let contents = self.read(from)?;
        self.write(to, &contents)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.add_dirs(path);
        Ok(())
    }

    fn size(&self, path: &Path) -> io::Result<u64> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| not_found(path))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        if self.is_dir(path) || self.is_file(path) {
            Ok(path.to_path_buf())
        } else {
            Err(not_found(path))
        }
    }

    fn subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.is_dir(path) {
            return Err(not_found(path));
        }
        Ok(self.dirs.borrow().iter().filter(|d| d.parent() == Some(path)).cloned().collect())
    }

    fn note_files(
        &self,
        root: &Path,
        excluded: &[PathBuf],
    ) -> Result<Vec<WalkedFile>, VaultWalkerError> {
        if !self.is_dir(root) {
            return Err(VaultWalkerError::MissingRoot(root.display().to_string()));
        }

        let files = self
            .files
            .borrow()
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(root).ok()?;
                let hidden = relative.components().any(|c| is_hidden(c.as_os_str()));
                let skipped = excluded
                    .iter()
                    .any(|ex| relative.starts_with(ex) || path.starts_with(ex));
                (!hidden && !skipped && is_note_file(path)).then(|| WalkedFile {
                    absolute_path: path.clone(),
                    relative_path: relative.to_path_buf(),
                })
            })
            .collect();

        Ok(files)
    }
}

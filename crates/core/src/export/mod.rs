//! Export runs: locate daily notes, follow their links, copy, summarize, package.

pub mod job;
pub mod manifest;
pub mod walker;

pub use job::{ExportJob, UnresolvedLink, slash_path};
pub use manifest::{MANIFEST_FILE_NAME, ManifestBuilder, format_size};
pub use walker::{DEFAULT_MAX_DEPTH, ExportWalker};

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;
use thiserror::Error;

use crate::config::types::ExportConfig;
use crate::daily::DailyNoteLocator;
use crate::index::{IndexBuilder, IndexError, TreeCommand};
use crate::package::{PackageError, Packager};
use crate::vault::{RealFs, VaultFs};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("vault root {path} is not accessible: {source}")]
    VaultRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Package error: {0}")]
    Package(#[from] PackageError),
}

/// Prefix of every timestamped export directory.
pub const RUN_DIR_PREFIX: &str = "export-";

/// Result of a completed export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// The timestamped export directory.
    pub destination: PathBuf,
    pub files_copied: usize,
    /// Number of daily notes found in the window.
    pub daily_notes: usize,
    /// Vault-relative paths of those daily notes, most recent first.
    pub daily_note_paths: Vec<String>,
    pub used_listing_tool: bool,
    pub unresolved_links: Vec<UnresolvedLink>,
    pub manifest_path: PathBuf,
    pub aggregate_path: PathBuf,
    /// Number of records in the aggregate document.
    pub notes_packaged: usize,
}

/// Runs exports against a [`VaultFs`].
pub struct Exporter<F = RealFs> {
    config: ExportConfig,
    fs: F,
}

impl Exporter<RealFs> {
    pub fn new(config: ExportConfig) -> Self {
        Self { config, fs: RealFs }
    }
}

impl<F: VaultFs> Exporter<F> {
    pub fn with_fs(config: ExportConfig, fs: F) -> Self {
        Self { config, fs }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// The run timestamp: the configured one, or now to the second.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.config.timestamp.unwrap_or_else(|| {
            let now = Local::now().naive_local();
            now.with_nanosecond(0).unwrap_or(now)
        })
    }

    /// Export directory for a run at `at`.
    pub fn destination_for(&self, at: NaiveDateTime) -> PathBuf {
        let name = format!("{RUN_DIR_PREFIX}{}", at.format("%Y%m%d-%H%M%S"));
        self.config.export_base.join(name)
    }

    pub fn run(&self) -> Result<ExportReport, ExportError> {
        let fs: &dyn VaultFs = &self.fs;
        let at = self.timestamp();

        let vault_root = fs.canonicalize(&self.config.vault_root).map_err(|source| {
            ExportError::VaultRoot { path: self.config.vault_root.clone(), source }
        })?;

        let destination = self.destination_for(at);
        fs.create_dir_all(&destination)
            .map_err(|source| ExportError::CreateDir { path: destination.clone(), source })?;
        let destination = fs.canonicalize(&destination).unwrap_or(destination);
        tracing::info!("exporting {} into {}", vault_root.display(), destination.display());

        let built = self.build_index(&vault_root)?;
        tracing::info!(
            "indexed {} note titles in {}ms{}",
            built.index.len(),
            built.duration_ms,
            if built.used_listing_tool { " (listing tool)" } else { "" }
        );

        let today = at.date();
        let daily_notes = DailyNoteLocator::new(fs, &vault_root, &built.index)
            .locate(today, self.config.days_back);
        tracing::info!(
            "found {} daily notes in the last {} days",
            daily_notes.len(),
            self.config.days_back
        );

        let mut job = ExportJob::new(&vault_root, &destination);
        let walker = ExportWalker::new(fs, &built.index).with_max_depth(self.config.max_depth);
        for note in &daily_notes {
            walker.walk(&mut job, note, 0)?;
        }
        tracing::info!("copied {} files", job.copied_files().len());

        let manifest_path = ManifestBuilder::new(fs, &job)
            .generated_at(at)
            .days_back(self.config.days_back)
            .used_listing_tool(built.used_listing_tool)
            .daily_notes(&daily_notes)
            .write()?;

        let packaged = Packager::new(fs).package(&destination)?;

        Ok(ExportReport {
            destination: destination.clone(),
            files_copied: job.copied_files().len(),
            daily_notes: daily_notes.len(),
            daily_note_paths: daily_notes.iter().map(|p| job.relative_display(p)).collect(),
            used_listing_tool: built.used_listing_tool,
            unresolved_links: job.unresolved_links().to_vec(),
            manifest_path,
            aggregate_path: packaged.path,
            notes_packaged: packaged.notes,
        })
    }

    fn build_index(&self, vault_root: &Path) -> Result<crate::index::BuiltIndex, ExportError> {
        let fs: &dyn VaultFs = &self.fs;

        // Earlier runs stored inside the vault stay out of the index. Only the
        // run directories are skipped, since the base may be the vault itself.
        let export_base =
            fs.canonicalize(&self.config.export_base).unwrap_or(self.config.export_base.clone());
        let excluded: Vec<PathBuf> = if export_base.starts_with(vault_root) {
            fs.subdirectories(&export_base)
                .unwrap_or_default()
                .into_iter()
                .filter(|dir| is_run_directory(dir))
                .collect()
        } else {
            Vec::new()
        };
        if !excluded.is_empty() {
            tracing::debug!("skipping {} earlier export directories", excluded.len());
        }

        let mut builder = IndexBuilder::new(fs, vault_root).with_exclusions(excluded);
        if self.config.use_listing_tool && fs.is_physical() {
            match TreeCommand::probe() {
                Some(tree) => builder = builder.with_listing(tree),
                None => tracing::debug!("tree not found on PATH, indexing by traversal"),
            }
        }

        Ok(builder.build()?)
    }
}

fn is_run_directory(dir: &Path) -> bool {
    dir.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(RUN_DIR_PREFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryFs;
    use chrono::NaiveDate;

    fn config(days: u32) -> ExportConfig {
        let mut config = ExportConfig::new("/vault").unwrap();
        config.days_back = days;
        config.export_base = PathBuf::from("/exports");
        config.use_listing_tool = false;
        config.timestamp =
            NaiveDate::from_ymd_opt(2026, 1, 21).and_then(|d| d.and_hms_opt(9, 15, 0));
        config
    }

    #[test]
    fn test_run_in_memory() {
        let fs = MemoryFs::new();
        fs.add_file("/vault/2026-01-21.md", "Today: [[Linked Page]]");
        fs.add_file("/vault/Linked Page.md", "linked");
        fs.add_file("/vault/Unrelated.md", "not exported");

        let exporter = Exporter::with_fs(config(1), fs);
        let report = exporter.run().unwrap();

        assert_eq!(report.destination, PathBuf::from("/exports/export-20260121-091500"));
        assert_eq!(report.files_copied, 2);
        assert_eq!(report.daily_notes, 1);
        assert_eq!(report.daily_note_paths, vec!["2026-01-21.md"]);
        assert!(!report.used_listing_tool);
        assert_eq!(report.notes_packaged, 2);

        let fs = exporter.fs();
        assert!(fs.is_file(&report.destination.join("Linked Page.md")));
        assert!(!fs.is_file(&report.destination.join("Unrelated.md")));
        assert!(fs.contents(&report.manifest_path).unwrap().contains("- Files copied: 2"));
        assert!(fs.contents(&report.aggregate_path).unwrap().contains("<path>Linked Page.md</path>"));
    }

    #[test]
    fn test_run_without_daily_notes_still_writes_manifest() {
        let fs = MemoryFs::new();
        fs.add_file("/vault/Old.md", "");

        let exporter = Exporter::with_fs(config(7), fs);
        let report = exporter.run().unwrap();

        assert_eq!(report.files_copied, 0);
        assert_eq!(report.daily_notes, 0);
        assert!(exporter.fs().is_file(&report.manifest_path));
        assert_eq!(report.notes_packaged, 0);
    }

    #[test]
    fn test_missing_vault_root_fails() {
        let exporter = Exporter::with_fs(config(1), MemoryFs::new());
        assert!(matches!(exporter.run(), Err(ExportError::VaultRoot { .. })));
    }

    #[test]
    fn test_exports_inside_vault_are_not_indexed() {
        let fs = MemoryFs::new();
        fs.add_file("/vault/exports/export-1/Topic.md", "old copy");
        fs.add_file("/vault/2026-01-21.md", "[[Topic]]");
        fs.add_file("/vault/zz/Topic.md", "current");

        let mut cfg = config(1);
        cfg.export_base = PathBuf::from("/vault/exports");
        let exporter = Exporter::with_fs(cfg, fs);
        let report = exporter.run().unwrap();

        assert_eq!(
            exporter.fs().contents(report.destination.join("zz/Topic.md")).as_deref(),
            Some("current")
        );
    }

    #[test]
    fn test_export_base_at_vault_root_keeps_notes_indexed() {
        let fs = MemoryFs::new();
        fs.add_file("/vault/2026-01-21.md", "Today: [[Topic]]");
        fs.add_file("/vault/export-20260101-080000/Topic.md", "stale copy");
        fs.add_file("/vault/zz/Topic.md", "current");

        let mut cfg = config(1);
        cfg.export_base = PathBuf::from("/vault");
        let exporter = Exporter::with_fs(cfg, fs);
        let report = exporter.run().unwrap();

        assert_eq!(report.destination, PathBuf::from("/vault/export-20260121-091500"));
        assert_eq!(report.files_copied, 2);
        assert!(report.unresolved_links.is_empty());
        assert_eq!(
            exporter.fs().contents(report.destination.join("zz/Topic.md")).as_deref(),
            Some("current")
        );
    }
}

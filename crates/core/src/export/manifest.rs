//! Human-readable summary of an export.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::ExportError;
use super::job::ExportJob;
use crate::package::AGGREGATE_FILE_NAME;
use crate::vault::VaultFs;

/// File name of the manifest inside the export directory.
pub const MANIFEST_FILE_NAME: &str = "export-manifest.md";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Format a byte count as `512B`, `2.0KB` or `2.0MB`.
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes}B")
    } else if bytes < MIB {
        format!("{:.1}KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    }
}

/// Builds the manifest from an export job. File sizes are read from the
/// export directory when the manifest is rendered.
pub struct ManifestBuilder<'a> {
    fs: &'a dyn VaultFs,
    job: &'a ExportJob,
    generated_at: Option<NaiveDateTime>,
    days_back: u32,
    used_listing_tool: bool,
    daily_notes: &'a [PathBuf],
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(fs: &'a dyn VaultFs, job: &'a ExportJob) -> Self {
        Self {
            fs,
            job,
            generated_at: None,
            days_back: 0,
            used_listing_tool: false,
            daily_notes: &[],
        }
    }

    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn days_back(mut self, days: u32) -> Self {
        self.days_back = days;
        self
    }

    pub fn used_listing_tool(mut self, used: bool) -> Self {
        self.used_listing_tool = used;
        self
    }

    pub fn daily_notes(mut self, notes: &'a [PathBuf]) -> Self {
        self.daily_notes = notes;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let generated = self
            .generated_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let _ = writeln!(out, "# Export Manifest\n");
        let _ = writeln!(out, "- Generated: {generated}");
        let _ = writeln!(out, "- Days back: {}", self.days_back);
        let _ = writeln!(out, "- Files copied: {}", self.job.copied_files().len());
        let _ = writeln!(
            out,
            "- Listing tool used: {}",
            if self.used_listing_tool { "yes" } else { "no" }
        );

        let _ = writeln!(out, "\n## Daily notes\n");
        if self.daily_notes.is_empty() {
            let _ = writeln!(out, "- (none)");
        }
        for note in self.daily_notes {
            let _ = writeln!(out, "- {}", self.job.relative_display(note));
        }

        let _ = writeln!(out, "\n## Copied files\n");
        if self.job.copied_files().is_empty() {
            let _ = writeln!(out, "- (none)");
        }
        for source in self.job.copied_files() {
            let size = match self.fs.size(&self.job.destination_for(source)) {
                Ok(bytes) => format_size(bytes),
                Err(_) => "missing".to_string(),
            };
            let _ = writeln!(out, "- {} ({size})", self.job.relative_display(source));
        }

        let unresolved = self.job.unresolved_links();
        if !unresolved.is_empty() {
            let _ = writeln!(out, "\n## Unresolved links\n");
            for link in unresolved {
                let _ = writeln!(out, "- {} -> {}", link.source, link.target);
            }
        }

        out
    }

    /// Render and write the manifest into the export directory.
    pub fn write(&self) -> Result<PathBuf, ExportError> {
        for source in overwritten_notes(self.job) {
            tracing::warn!(
                "{} is replaced by the generated file of the same name",
                self.job.relative_display(source)
            );
        }

        let path = manifest_path(self.job.destination());
        self.fs
            .write(&path, self.render().as_bytes())
            .map_err(|source| ExportError::Write { path: path.clone(), source })?;
        Ok(path)
    }
}

pub fn manifest_path(destination: &Path) -> PathBuf {
    destination.join(MANIFEST_FILE_NAME)
}

/// Copied notes whose export path is taken by the manifest or the aggregate.
pub fn overwritten_notes(job: &ExportJob) -> Vec<&Path> {
    job.copied_files()
        .iter()
        .filter(|source| {
            let dest = job.destination_for(source);
            dest.parent() == Some(job.destination())
                && dest
                    .file_name()
                    .is_some_and(|n| n == MANIFEST_FILE_NAME || n == AGGREGATE_FILE_NAME)
        })
        .map(PathBuf::as_path)
        .collect()
}

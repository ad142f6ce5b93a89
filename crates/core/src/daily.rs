//! Daily note discovery.
//!
//! A daily note is any note whose file stem spells a calendar date in one of
//! the accepted conventions. For each day the conventions are tried in order,
//! and for each convention the note is looked for directly under the vault
//! root, inside a folder of the same name, and finally in the title index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use crate::NOTE_EXTENSION;
use crate::index::FileIndex;
use crate::vault::VaultFs;

/// Accepted date formats for daily note file stems, in precedence order.
pub const DAILY_FORMATS: &[&str] =
    &["%Y-%m-%d", "%B %d, %Y", "%B %-d, %Y", "%b %d, %Y", "%b %-d, %Y", "%d-%m-%Y"];

/// A date paired with one file stem it may be written as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyNoteCandidate {
    pub date: NaiveDate,
    pub stem: String,
}

/// Candidate stems for `date`, in precedence order, without duplicates.
pub fn candidates(date: NaiveDate) -> Vec<DailyNoteCandidate> {
    let mut seen = HashSet::new();
    DAILY_FORMATS
        .iter()
        .map(|fmt| date.format(fmt).to_string())
        .filter(|stem| seen.insert(stem.clone()))
        .map(|stem| DailyNoteCandidate { date, stem })
        .collect()
}

pub struct DailyNoteLocator<'a> {
    fs: &'a dyn VaultFs,
    vault_root: &'a Path,
    index: &'a FileIndex,
}

impl<'a> DailyNoteLocator<'a> {
    pub fn new(fs: &'a dyn VaultFs, vault_root: &'a Path, index: &'a FileIndex) -> Self {
        Self { fs, vault_root, index }
    }

    /// Daily notes of the `days` days ending at `today`, most recent first,
    /// without duplicates. Days without a note contribute nothing.
    pub fn locate(&self, today: NaiveDate, days: u32) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for offset in 0..days {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };
            match self.locate_day(date) {
                Some(path) => {
                    if seen.insert(path.clone()) {
                        found.push(path);
                    }
                }
                None => tracing::debug!("no daily note for {}", date),
            }
        }

        found
    }

    /// The daily note for `date`, if any convention resolves.
    pub fn locate_day(&self, date: NaiveDate) -> Option<PathBuf> {
        candidates(date).into_iter().find_map(|c| self.resolve(&c))
    }

    fn resolve(&self, candidate: &DailyNoteCandidate) -> Option<PathBuf> {
        let file_name = format!("{}.{}", candidate.stem, NOTE_EXTENSION);

        let direct = self.vault_root.join(&file_name);
        if self.fs.is_file(&direct) {
            return Some(direct);
        }

        let nested = self.vault_root.join(&candidate.stem).join(&file_name);
        if self.fs.is_file(&nested) {
            return Some(nested);
        }

        // Plain lowercase here, not the full title normalization.
        self.index.get(&candidate.stem.to_lowercase()).map(Path::to_path_buf)
    }
}

//! Packaging a directory of notes into one XML document.
//!
//! The document is the only output meant for other programs, so its format
//! is fixed:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <notes count="1">
//!   <note>
//!     <filename>Page.md</filename>
//!     <path>Folder/Page.md</path>
//!     <content><![CDATA[...note text...]]></content>
//!   </note>
//! </notes>
//! ```
//!
//! Note text is carried in CDATA and is never escaped; only the filename and
//! path fields are.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::export::{MANIFEST_FILE_NAME, slash_path};
use crate::vault::{VaultFs, VaultWalkerError};

/// File name of the aggregate document.
pub const AGGREGATE_FILE_NAME: &str = "export.xml";

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to scan {0}")]
    Scan(#[from] VaultWalkerError),

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
}

/// A note read back from the directory being packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedNote {
    pub filename: String,
    /// Path relative to the packaged directory, `/`-separated.
    pub relative_path: String,
    pub content: String,
}

/// Outcome of packaging a directory.
#[derive(Debug, Clone)]
pub struct PackageSummary {
    pub path: PathBuf,
    pub notes: usize,
}

pub struct Packager<'a> {
    fs: &'a dyn VaultFs,
    output_name: String,
}

impl<'a> Packager<'a> {
    pub fn new(fs: &'a dyn VaultFs) -> Self {
        Self { fs, output_name: AGGREGATE_FILE_NAME.to_string() }
    }

    /// Write the document under a different file name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    fn is_excluded(&self, filename: &str) -> bool {
        filename == MANIFEST_FILE_NAME
            || filename == AGGREGATE_FILE_NAME
            || filename == self.output_name
    }

    /// Read every note under `root`, sorted by relative path.
    pub fn collect(&self, root: &Path) -> Result<Vec<ExportedNote>, PackageError> {
        let mut notes = Vec::new();

        for file in self.fs.note_files(root, &[])? {
            let filename = file
                .absolute_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.is_excluded(&filename) {
                continue;
            }

            let bytes = self.fs.read(&file.absolute_path).map_err(|source| {
                PackageError::Read { path: file.absolute_path.clone(), source }
            })?;

            notes.push(ExportedNote {
                filename,
                relative_path: slash_path(&file.relative_path),
                content: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        notes.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(notes)
    }

    /// Package every note under `root` into the aggregate document there.
    pub fn package(&self, root: &Path) -> Result<PackageSummary, PackageError> {
        let notes = self.collect(root)?;
        let path = root.join(&self.output_name);

        self.fs
            .write(&path, render(&notes).as_bytes())
            .map_err(|source| PackageError::Write { path: path.clone(), source })?;

        tracing::info!("packaged {} notes into {}", notes.len(), path.display());
        Ok(PackageSummary { path, notes: notes.len() })
    }
}

/// Render notes as the aggregate XML document.
pub fn render(notes: &[ExportedNote]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<notes count=\"{}\">\n", notes.len()));

    for note in notes {
        out.push_str("  <note>\n");
        out.push_str(&format!("    <filename>{}</filename>\n", escape_xml(&note.filename)));
        out.push_str(&format!("    <path>{}</path>\n", escape_xml(&note.relative_path)));
        out.push_str(&format!("    <content>{}</content>\n", cdata(&note.content)));
        out.push_str("  </note>\n");
    }

    out.push_str("</notes>\n");
    out
}

/// Escape text for use in XML character data or attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap text in CDATA, splitting any `]]>` across two sections so a parser
/// yields the original text unchanged.
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}

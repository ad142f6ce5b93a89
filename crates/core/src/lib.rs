#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::return_self_not_must_use
)]

//! Export recent daily notes, and everything they link to, out of a markdown vault.
//!
//! The pipeline is: build a [`index::FileIndex`] of the vault, locate the daily
//! notes of the last few days, follow their `[[wikilinks]]` up to a bounded depth
//! copying every reached note into a timestamped export directory, then write a
//! manifest and a single aggregated XML document of the exported notes.

pub mod config;
pub mod daily;
pub mod export;
pub mod index;
pub mod normalize;
pub mod package;
pub mod vault;

pub use export::{ExportError, ExportReport, Exporter};

/// Extension used by note files in the vault.
pub const NOTE_EXTENSION: &str = "md";

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

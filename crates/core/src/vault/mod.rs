//! Vault file access, discovery and link extraction.
//!
//! This module provides the filesystem seam used by every export stage,
//! the deterministic note walker, and wikilink extraction from note text.

pub mod fs;
pub mod links;
pub mod walker;

pub use fs::{MemoryFs, RealFs, VaultFs};
pub use links::extract_links;
pub use walker::{VaultWalker, VaultWalkerError, WalkedFile};

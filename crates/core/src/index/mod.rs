//! Title index of every note in the vault.
//!
//! The index can be built from the listing of an external directory-tree
//! tool or from a direct traversal of the vault; both produce the same
//! [`FileIndex`], and [`IndexBuilder`] falls back from the first to the second
//! whenever the tool is missing or its output unusable.

pub mod builder;
pub mod listing;
pub mod types;

pub use builder::{BuiltIndex, IndexBuilder, IndexError, IndexSource, TraversalSource};
pub use listing::{
    ListingIndexSource, ListingNode, ListingProvider, NodeKind, TreeCommand, index_from_listing,
    parse_listing,
};
pub use types::FileIndex;

//! Index building from a directory-tree listing.
//!
//! The listing is the JSON emitted by `tree -J -f`: an array of nodes, each
//! with a `type` (`file`, `directory`, `report`, ...), a `name`, and for
//! directories a nested `contents` array.
//!
//! `tree` orders siblings with the locale's collation, so siblings are
//! re-sorted by file name bytes before registration. That is the order the
//! traversal strategy uses, and both strategies pick the same winner for a
//! duplicated title.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use super::builder::{IndexError, IndexSource};
use super::types::FileIndex;
use crate::vault::walker::is_note_file;

/// One node of a directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contents: Vec<ListingNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
    Report,
    /// Symlinks, sockets and anything else the tool may report.
    #[serde(other)]
    Other,
}

/// Parse the JSON listing produced by the tree tool.
pub fn parse_listing(json: &str) -> Result<Vec<ListingNode>, IndexError> {
    if json.trim().is_empty() {
        return Err(IndexError::EmptyListing);
    }
    serde_json::from_str(json).map_err(IndexError::MalformedListing)
}

/// Build an index from listing nodes rooted at `parent`.
///
/// Node names are joined onto their parent's path unless they are already
/// absolute. Nodes whose full path falls under one of `excluded` are skipped
/// together with their contents.
pub fn index_from_listing(
    nodes: &[ListingNode],
    parent: &Path,
    excluded: &[PathBuf],
) -> FileIndex {
    let mut index = FileIndex::new();
    register_nodes(&mut index, nodes, parent, excluded);
    index
}

fn register_nodes(
    index: &mut FileIndex,
    nodes: &[ListingNode],
    parent: &Path,
    excluded: &[PathBuf],
) {
    let mut named: Vec<(&ListingNode, &str)> = nodes
        .iter()
        .filter(|node| node.kind != NodeKind::Report)
        .filter_map(|node| {
            let name = node.name.as_deref().filter(|n| !n.is_empty())?;
            Some((node, name))
        })
        .collect();
    named.sort_by(|(_, a), (_, b)| sort_key(a).cmp(sort_key(b)));

    for (node, name) in named {
        let full_path = if Path::new(name).is_absolute() {
            PathBuf::from(name)
        } else {
            parent.join(name)
        };

        if excluded.iter().any(|ex| full_path.starts_with(ex)) {
            continue;
        }

        match node.kind {
            NodeKind::File if is_note_file(&full_path) => {
                index.register(&full_path);
            }
            NodeKind::Directory => {
                register_nodes(index, &node.contents, &full_path, excluded);
            }
            _ => {}
        }
    }
}

fn sort_key(name: &str) -> &[u8] {
    Path::new(name).file_name().map_or(name.as_bytes(), |n| n.as_encoded_bytes())
}

/// Something that can produce a JSON directory listing of a vault.
pub trait ListingProvider {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    fn listing(&self, root: &Path) -> Result<String, IndexError>;
}

/// The `tree` program, located on `PATH`.
#[derive(Debug, Clone)]
pub struct TreeCommand {
    program: PathBuf,
}

impl TreeCommand {
    /// Locate `tree` on `PATH`.
    pub fn probe() -> Option<Self> {
        which::which("tree").ok().map(|program| Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `-N` prints names verbatim instead of escaping non-ASCII bytes as `?`,
    /// and the C locale keeps sibling order independent of the environment.
    fn command(&self, root: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-J", "-f", "-N", "--noreport"]).arg(root).env("LC_ALL", "C");
        cmd
    }
}

impl ListingProvider for TreeCommand {
    fn name(&self) -> &str {
        "tree"
    }

    fn listing(&self, root: &Path) -> Result<String, IndexError> {
        let output = self
            .command(root)
            .output()
            .map_err(|e| IndexError::ToolSpawn(self.program.display().to_string(), e))?;

        if !output.status.success() {
            return Err(IndexError::ToolFailed(output.status.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// [`IndexSource`] that indexes a vault from a [`ListingProvider`].
pub struct ListingIndexSource<P> {
    provider: P,
    excluded: Vec<PathBuf>,
}

impl<P: ListingProvider> ListingIndexSource<P> {
    pub fn new(provider: P, excluded: Vec<PathBuf>) -> Self {
        Self { provider, excluded }
    }
}

impl<P: ListingProvider> IndexSource for ListingIndexSource<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn build(&self, vault_root: &Path) -> Result<FileIndex, IndexError> {
        let json = self.provider.listing(vault_root)?;
        let nodes = parse_listing(&json)?;
        Ok(index_from_listing(&nodes, vault_root, &self.excluded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    const LISTING: &str = r#"[
      {"type":"directory","name":"/vault","contents":[
        {"type":"directory","name":"/vault/Projects","contents":[
          {"type":"file","name":"/vault/Projects/Roadmap.md"},
          {"type":"file","name":"/vault/Projects/diagram.png"}
        ]},
        {"type":"file","name":"/vault/Roadmap.md"},
        {"type":"file","name":""},
        {"type":"link","name":"/vault/alias.md","target":"Roadmap.md"}
      ]},
      {"type":"report","directories":1,"files":3}
    ]"#;

    #[test]
    fn test_index_from_absolute_listing() {
        let nodes = parse_listing(LISTING).unwrap();
        let index = index_from_listing(&nodes, Path::new("/vault"), &[]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("roadmap"), Some(Path::new("/vault/Projects/Roadmap.md")));
    }

    #[test]
    fn test_relative_names_join_parent() {
        let json = r#"[{"type":"directory","name":"Daily","contents":[
            {"type":"file","name":"2026-01-21.md"}
        ]}]"#;
        let nodes = parse_listing(json).unwrap();
        let index = index_from_listing(&nodes, Path::new("/vault"), &[]);

        assert_eq!(index.get("2026-01-21"), Some(Path::new("/vault/Daily/2026-01-21.md")));
    }

    #[test]
    fn test_excluded_subtree_skipped() {
        let json = r#"[{"type":"directory","name":"/vault","contents":[
            {"type":"directory","name":"/vault/out","contents":[
              {"type":"file","name":"/vault/out/Note.md"}
            ]},
            {"type":"file","name":"/vault/z/Note.md"}
        ]}]"#;
        let nodes = parse_listing(json).unwrap();
        let index =
            index_from_listing(&nodes, Path::new("/vault"), &[PathBuf::from("/vault/out")]);

        assert_eq!(index.get("note"), Some(Path::new("/vault/z/Note.md")));
    }

    #[test]
    fn test_siblings_registered_in_byte_order() {
        // Collated order, as tree prints it under en_US.
        let json = r#"[{"type":"directory","name":"/vault","contents":[
            {"type":"directory","name":"/vault/a","contents":[
              {"type":"file","name":"/vault/a/Topic.md"}
            ]},
            {"type":"directory","name":"/vault/B","contents":[
              {"type":"file","name":"/vault/B/Topic.md"}
            ]}
        ]}]"#;
        let nodes = parse_listing(json).unwrap();
        let index = index_from_listing(&nodes, Path::new("/vault"), &[]);

        assert_eq!(index.get("topic"), Some(Path::new("/vault/B/Topic.md")));
    }

    #[test]
    fn test_tree_command_prints_raw_names_in_c_locale() {
        let tree = TreeCommand { program: PathBuf::from("tree") };
        let cmd = tree.command(Path::new("/vault"));

        let args: Vec<_> = cmd.get_args().collect();
        assert!(args.contains(&OsStr::new("-N")));
        assert!(args.contains(&OsStr::new("-J")));
        assert_eq!(args.last(), Some(&OsStr::new("/vault")));
        assert!(
            cmd.get_envs()
                .any(|(k, v)| k == OsStr::new("LC_ALL") && v == Some(OsStr::new("C")))
        );
    }

    #[test]
    fn test_empty_and_malformed_listing() {
        assert!(matches!(parse_listing("  \n"), Err(IndexError::EmptyListing)));
        assert!(matches!(parse_listing("{not json"), Err(IndexError::MalformedListing(_))));
    }
}

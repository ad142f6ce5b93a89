//! Wikilink extraction from note content.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

// Matches [[target]], [[target#anchor]], [[target|alias]] and [[target#anchor|alias]].
// The target capture stops at the first `]`, `|` or `#`.
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|#]+)(?:#[^\]|]*)?(?:\|[^\]]*)?\]\]").unwrap()
});

/// Extract the unique wikilink targets of `content`, in first-seen order.
///
/// Anchors and aliases are dropped and targets are trimmed. Folder prefixes
/// (`[[Folder/Page]]`) are kept as written.
pub fn extract_links(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for cap in WIKILINK_RE.captures_iter(content) {
        let target = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if target.is_empty() {
            continue;
        }
        if seen.insert(target.to_string()) {
            links.push(target.to_string());
        }
    }

    links
}

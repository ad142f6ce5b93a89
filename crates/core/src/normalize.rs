//! Title normalization for note lookup.

/// Canonicalize a note title into the key used by the file index.
///
/// Dash variants U+2010..=U+2015 become `-`, whitespace runs collapse to a
/// single space, the result is lowercased and trimmed, in that order.
pub fn normalize(title: &str) -> String {
    let dashed: String = title
        .chars()
        .map(|c| if ('\u{2010}'..='\u{2015}').contains(&c) { '-' } else { c })
        .collect();

    let mut collapsed = String::with_capacity(dashed.len());
    let mut in_space = false;
    for c in dashed.chars() {
        if c.is_whitespace() {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(c);
            in_space = false;
        }
    }

    collapsed.to_lowercase().trim().to_string()
}

/// Like [`normalize`], but an absent title yields the empty key.
pub fn normalize_opt(title: Option<&str>) -> String {
    title.map(normalize).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("My\u{2014}File", "my-file")]
    #[case("My\u{2010}File", "my-file")]
    #[case("My\u{2013}File", "my-file")]
    #[case("My-File", "my-file")]
    #[case("  A   B  ", "a b")]
    #[case("Tabs\tand\nnewlines", "tabs and newlines")]
    #[case("", "")]
    #[case("   ", "")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn test_dash_variants_share_a_key() {
        assert_eq!(normalize("My\u{2014}File"), normalize("My-File"));
    }

    #[test]
    fn test_dash_next_to_whitespace() {
        assert_eq!(normalize("A \u{2015}  B"), "a - b");
    }

    #[test]
    fn test_absent_title() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" X ")), "x");
    }
}

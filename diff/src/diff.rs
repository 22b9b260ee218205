//! Line-level set difference between two documents.

use std::collections::BTreeSet;

/// The lines added and deleted from a left document to a right document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineDiff {
    /// Lines of the right document missing from the left one, sorted
    pub adds: Vec<String>,
    /// Lines of the left document missing from the right one, sorted
    pub dels: Vec<String>,
}

impl LineDiff {
    /// Whether both documents have the same lines.
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.dels.is_empty()
    }
}

/// Compute the set difference between the non-empty lines of `left` and `right`.
///
/// Duplicate lines and line order are ignored.
/// No RDF semantics is involved:
/// both documents are expected to have gone through the same normalization beforehand.
pub fn compute_diff(left: &str, right: &str) -> LineDiff {
    let l = lines(left);
    let r = lines(right);
    LineDiff {
        adds: r.difference(&l).map(|line| line.to_string()).collect(),
        dels: l.difference(&r).map(|line| line.to_string()).collect(),
    }
}

fn lines(text: &str) -> BTreeSet<&str> {
    text.lines().filter(|line| !line.is_empty()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adds_and_dels() {
        let got = compute_diff("b\na\nc\n", "c\nd\n\na\nd\n");
        assert_eq!(got.adds, ["d"]);
        assert_eq!(got.dels, ["b"]);
        assert!(!got.is_empty());
    }

    #[test]
    fn sorted_output() {
        let got = compute_diff("", "z\ny\nx");
        assert_eq!(got.adds, ["x", "y", "z"]);
        assert!(got.dels.is_empty());
    }

    #[test]
    fn same_lines() {
        assert!(compute_diff("a\nb\n", "b\na\na\n").is_empty());
        assert!(compute_diff("", "\n\n").is_empty());
    }

    #[test]
    fn crlf() {
        assert!(compute_diff("a\r\nb\r\n", "a\nb\n").is_empty());
    }
}

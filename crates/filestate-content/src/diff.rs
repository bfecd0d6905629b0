//! Line diffs for change reports

use similar::{ChangeTag, TextDiff};

/// Number of unchanged lines shown around each hunk
const CONTEXT_RADIUS: usize = 3;

/// Line-level comparison of two texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiff {
    /// Lines present only in the new text
    pub added: usize,
    /// Lines present only in the old text
    pub removed: usize,
    /// Unified diff, empty when the texts are equal
    pub unified: String,
}

impl LineDiff {
    /// Compare `old` and `new`, labelling the unified diff with `label`.
    ///
    /// Uses the `similar` crate's TextDiff for line-by-line comparison.
    pub fn compute(old: &str, new: &str, label: &str) -> Self {
        if old == new {
            return Self {
                added: 0,
                removed: 0,
                unified: String::new(),
            };
        }

        let text_diff = TextDiff::from_lines(old, new);

        let mut added = 0;
        let mut removed = 0;
        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => added += 1,
                ChangeTag::Delete => removed += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = text_diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(label, label)
            .to_string();

        Self {
            added,
            removed,
            unified,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_texts_have_empty_diff() {
        let diff = LineDiff::compute("a\n", "a\n", "f");
        assert!(diff.is_empty());
        assert!(diff.unified.is_empty());
    }

    #[test]
    fn counts_added_and_removed_lines() {
        let diff = LineDiff::compute("a\nb\n", "a\nc\nd\n", "f");
        assert_eq!(diff.added, 2);
        assert_eq!(diff.removed, 1);
        assert!(diff.unified.contains("-b"));
        assert!(diff.unified.contains("+c"));
        assert!(diff.unified.starts_with("--- f"));
    }
}

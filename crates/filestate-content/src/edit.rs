//! Outcome types for content modification.

/// Result of running a mutator over file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The content must change.
    Changed(TextEdit),
    /// The desired edit is already present; nothing to do.
    AlreadyApplied,
    /// Nothing in the content matches the requested pattern.
    NotFound,
}

impl EditOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// A computed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Full content after the edit.
    pub content: String,
    /// The new form of every line that was added or modified.
    pub lines: Vec<String>,
}

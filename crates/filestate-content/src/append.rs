//! Appending lines that are not yet present

use crate::edit::{EditOutcome, TextEdit};
use crate::lines;

/// Append every line of `text` that does not already appear in `content`.
///
/// Entries of `text` containing newlines are split into separate lines.
/// Lines are compared exactly (ignoring only the line terminator) and are
/// appended at most once, in order. A missing final newline is added
/// before the new lines.
pub fn append_lines<S: AsRef<str>>(content: &str, text: &[S]) -> EditOutcome {
    let existing: Vec<&str> = lines::split(content).map(|(line, _)| line).collect();

    let mut additions: Vec<String> = Vec::new();
    for line in text.iter().flat_map(|chunk| chunk.as_ref().lines()) {
        let present = existing.contains(&line) || additions.iter().any(|a| a == line);
        if !present {
            additions.push(line.to_string());
        }
    }

    if additions.is_empty() {
        return EditOutcome::AlreadyApplied;
    }

    let mut updated = String::with_capacity(content.len() + additions.len() * 16);
    updated.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        updated.push('\n');
    }
    for line in &additions {
        updated.push_str(line);
        updated.push('\n');
    }

    EditOutcome::Changed(TextEdit {
        content: updated,
        lines: additions,
    })
}

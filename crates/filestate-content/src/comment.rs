//! Commenting and uncommenting lines by pattern

use regex::Regex;

use crate::edit::{EditOutcome, TextEdit};
use crate::{Error, Result, lines};

/// Comments or uncomments lines whose uncommented form matches a pattern.
///
/// A line counts as commented when, after optional indentation, it starts
/// with the marker. The uncommented form is the text after the marker with
/// at most one whitespace character removed.
#[derive(Debug, Clone)]
pub struct Commenter {
    pattern: Regex,
    marker: String,
}

impl Commenter {
    pub fn new(pattern: &str, marker: &str) -> Result<Self> {
        if marker.is_empty() || marker.contains(['\n', '\r']) {
            return Err(Error::InvalidMarker {
                marker: marker.to_string(),
                reason: "must be non-empty and single-line".to_string(),
            });
        }

        Ok(Self {
            pattern: Regex::new(pattern).map_err(|e| Error::regex(pattern, e))?,
            marker: marker.to_string(),
        })
    }

    /// Split a commented line into `(indentation, uncommented form)`.
    fn split_commented<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];
        let rest = trimmed.strip_prefix(self.marker.as_str())?;

        let mut chars = rest.chars();
        let rest = match chars.next() {
            Some(c) if c == ' ' || c == '\t' => chars.as_str(),
            _ => rest,
        };
        Some((indent, rest))
    }

    /// Prefix every matching, not yet commented line with the marker.
    pub fn comment(&self, content: &str) -> EditOutcome {
        let mut already_commented = false;

        let (updated, touched) = lines::rewrite(content, |line| {
            if let Some((_, rest)) = self.split_commented(line) {
                already_commented |= self.pattern.is_match(rest);
                return None;
            }
            self.pattern
                .is_match(line)
                .then(|| format!("{}{}", self.marker, line))
        });

        if !touched.is_empty() {
            EditOutcome::Changed(TextEdit {
                content: updated,
                lines: touched,
            })
        } else if already_commented {
            EditOutcome::AlreadyApplied
        } else {
            EditOutcome::NotFound
        }
    }

    /// Strip the marker from every commented line whose uncommented form
    /// matches, keeping indentation.
    pub fn uncomment(&self, content: &str) -> EditOutcome {
        let (updated, touched) = lines::rewrite(content, |line| {
            let (indent, rest) = self.split_commented(line)?;
            self.pattern
                .is_match(rest)
                .then(|| format!("{indent}{rest}"))
        });

        if !touched.is_empty() {
            return EditOutcome::Changed(TextEdit {
                content: updated,
                lines: touched,
            });
        }

        let already_uncommented = lines::split(content).any(|(line, _)| {
            self.split_commented(line).is_none() && self.pattern.is_match(line)
        });
        if already_uncommented {
            EditOutcome::AlreadyApplied
        } else {
            EditOutcome::NotFound
        }
    }
}

//! Regex substitution across a file

use regex::Regex;

use crate::edit::{EditOutcome, TextEdit};
use crate::{Error, Result, lines};

/// Replace every match of `before` with `after`, line by line.
///
/// `after` may reference capture groups (`$1`, `${name}`). When `limit` is
/// set only lines matching it are edited.
#[derive(Debug, Clone)]
pub struct Sed {
    before: Regex,
    after: String,
    limit: Option<Regex>,
}

impl Sed {
    pub fn new(before: &str, after: &str, limit: Option<&str>) -> Result<Self> {
        let before_re = Regex::new(before).map_err(|e| Error::regex(before, e))?;
        let limit = limit
            .map(|pattern| Regex::new(pattern).map_err(|e| Error::regex(pattern, e)))
            .transpose()?;

        Ok(Self {
            before: before_re,
            after: after.to_string(),
            limit,
        })
    }

    fn in_scope(&self, line: &str) -> bool {
        self.limit.as_ref().is_none_or(|limit| limit.is_match(line))
    }

    /// Compute the substitution over `content`.
    ///
    /// When nothing changes the edit counts as already applied if `before`
    /// still matches (a self-replacement) or the `after` text is present;
    /// otherwise the pattern was not found.
    pub fn apply(&self, content: &str) -> EditOutcome {
        let (updated, touched) = lines::rewrite(content, |line| {
            if !self.in_scope(line) {
                return None;
            }
            let replaced = self.before.replace_all(line, self.after.as_str());
            (replaced != line).then(|| replaced.into_owned())
        });

        if !touched.is_empty() {
            return EditOutcome::Changed(TextEdit {
                content: updated,
                lines: touched,
            });
        }

        let matched = lines::split(content)
            .any(|(line, _)| self.in_scope(line) && self.before.is_match(line));
        if matched || content.contains(&self.after) {
            EditOutcome::AlreadyApplied
        } else {
            EditOutcome::NotFound
        }
    }
}

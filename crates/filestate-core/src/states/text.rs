//! sed, comment, uncomment and append
//!
//! The mutators in `filestate-content` decide what the new content is; this
//! module reads the target, turns their outcome into a plan and writes the
//! result atomically.

use std::path::Path;

use filestate_content::{Commenter, EditOutcome, LineDiff, Sed, append_lines};
use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};

use super::{display, make_parent, require_parent};
use crate::declaration::AppendSpec;
use crate::outcome::{Plan, StateResult, changes, settle};
use crate::{Error, Result};

const NOT_FOUND: &str = "Pattern not found";

struct Wording {
    pending: String,
    applied: String,
    converged: String,
}

/// What to do when the target file does not exist
#[derive(Clone, Copy, PartialEq, Eq)]
enum Missing {
    Fail,
    /// Start from empty content, creating parents when allowed
    Create { makedirs: bool },
}

pub(crate) fn sed(target: &Path, sed: &Sed, dry_run: bool) -> Result<StateResult> {
    let name = display(target);
    let wording = Wording {
        pending: format!("File {name} would be edited"),
        applied: format!("Edited {name}"),
        converged: "Edit already performed".to_string(),
    };
    edit_file(target, dry_run, Missing::Fail, wording, |content| {
        sed.apply(content)
    })
}

pub(crate) fn comment(target: &Path, commenter: &Commenter, dry_run: bool) -> Result<StateResult> {
    let wording = Wording {
        pending: format!("Lines in {} would be commented", display(target)),
        applied: "Commented lines successfully".to_string(),
        converged: "Pattern already commented".to_string(),
    };
    edit_file(target, dry_run, Missing::Fail, wording, |content| {
        commenter.comment(content)
    })
}

pub(crate) fn uncomment(
    target: &Path,
    commenter: &Commenter,
    dry_run: bool,
) -> Result<StateResult> {
    let wording = Wording {
        pending: format!("Lines in {} would be uncommented", display(target)),
        applied: "Uncommented lines successfully".to_string(),
        converged: "Pattern already uncommented".to_string(),
    };
    edit_file(target, dry_run, Missing::Fail, wording, |content| {
        commenter.uncomment(content)
    })
}

pub(crate) fn append(target: &Path, spec: &AppendSpec, dry_run: bool) -> Result<StateResult> {
    let name = display(target);
    let wording = Wording {
        pending: format!("Lines would be appended to {name}"),
        applied: format!("Appended text to {name}"),
        converged: format!("File {name} is in correct state"),
    };
    let missing = if spec.makedirs {
        Missing::Create { makedirs: true }
    } else {
        Missing::Fail
    };
    edit_file(target, dry_run, missing, wording, |content| {
        append_lines(content, spec.lines.as_slice())
    })
}

fn edit_file<F>(
    target: &Path,
    dry_run: bool,
    missing: Missing,
    wording: Wording,
    compute: F,
) -> Result<StateResult>
where
    F: FnOnce(&str) -> EditOutcome,
{
    let name = display(target);
    let current = match probe::probe(target)? {
        EntryKind::File => String::from_utf8(io::read_bytes(target)?)
            .map_err(|_| Error::type_conflict(target, "a UTF-8 text file", "binary content"))?,
        EntryKind::Missing => match missing {
            Missing::Fail => {
                return Err(Error::PathNotFound {
                    path: target.to_path_buf(),
                });
            }
            Missing::Create { makedirs } => {
                require_parent(target, makedirs)?;
                String::new()
            }
        },
        found => return Err(Error::type_conflict(target, "a file", found.describe())),
    };

    let plan = match compute(&current) {
        EditOutcome::AlreadyApplied => Plan::converged(wording.converged),
        EditOutcome::NotFound => {
            tracing::debug!(path = %name, "no line matched");
            return Ok(StateResult::failed(name, NOT_FOUND));
        }
        EditOutcome::Changed(edit) => {
            let diff = LineDiff::compute(&current, &edit.content, &name);
            tracing::debug!(path = %name, added = diff.added, removed = diff.removed, "planned edit");
            Plan::change(
                wording.pending,
                changes([("diff", diff.unified), ("new", edit.lines.join("\n"))]),
                edit.content,
            )
        }
    };

    settle(target, plan, dry_run, |content| {
        if missing != Missing::Fail {
            make_parent(target)?;
        }
        io::write_text(target, &content).map_err(|e| Error::write(target, e))?;

        if io::read_text(target)? != content {
            return Err(Error::Unconverged {
                path: target.to_path_buf(),
                message: "content differs after write".to_string(),
            });
        }
        Ok(wording.applied)
    })
}

//! directory: ensure a directory exists

use std::path::Path;

use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};

use super::{display, require_parent};
use crate::declaration::DirectorySpec;
use crate::outcome::{Plan, StateResult, changes, settle};
use crate::{Error, Result};

pub(crate) fn plan(target: &Path, spec: &DirectorySpec) -> Result<Plan<()>> {
    let name = display(target);
    match probe::probe(target)? {
        EntryKind::Directory => Ok(Plan::converged(format!(
            "Directory {name} is in the correct state"
        ))),
        EntryKind::Symlink { .. } if target.is_dir() => Ok(Plan::converged(format!(
            "Directory {name} is a symlink to an existing directory"
        ))),
        EntryKind::Missing => {
            require_parent(target, spec.makedirs)?;
            Ok(Plan::change(
                format!("Directory {name} would be created"),
                changes([(name.as_str(), "New Dir")]),
                (),
            ))
        }
        found => Err(Error::type_conflict(target, "a directory", found.describe())),
    }
}

pub(crate) fn reconcile(target: &Path, spec: &DirectorySpec, dry_run: bool) -> Result<StateResult> {
    let plan = plan(target, spec)?;
    settle(target, plan, dry_run, |()| {
        io::create_dir_all(target).map_err(|e| Error::write(target, e))?;
        if !target.is_dir() {
            return Err(Error::Unconverged {
                path: target.to_path_buf(),
                message: "directory missing after creation".to_string(),
            });
        }
        Ok(format!("Directory {} created", target.display()))
    })
}

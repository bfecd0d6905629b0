//! absent: ensure nothing exists at a path

use std::path::Path;

use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};

use super::display;
use crate::outcome::{Plan, StateResult, changes, settle};
use crate::request::StateKind;
use crate::{Error, Result};

pub(crate) fn plan(target: &Path) -> Result<Plan<EntryKind>> {
    if target.parent().is_none() {
        return Err(Error::invalid(
            StateKind::Absent,
            "refusing to remove the filesystem root",
        ));
    }

    let name = display(target);
    let plan = match probe::probe(target)? {
        EntryKind::Missing => Plan::converged(format!("{name} is not present")),
        found => Plan::change(
            format!("{name} ({}) would be removed", found.describe()),
            changes([("removed", name.as_str())]),
            found,
        ),
    };
    Ok(plan)
}

pub(crate) fn reconcile(target: &Path, dry_run: bool) -> Result<StateResult> {
    let plan = plan(target)?;
    settle(target, plan, dry_run, |found| {
        io::remove_entry(target).map_err(|e| Error::write(target, e))?;

        if probe::probe(target)?.exists() {
            return Err(Error::Unconverged {
                path: target.to_path_buf(),
                message: "entry reappeared after removal".to_string(),
            });
        }
        Ok(format!("Removed {} {}", found.describe(), target.display()))
    })
}

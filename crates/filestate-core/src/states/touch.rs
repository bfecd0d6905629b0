//! touch: ensure a path exists and refresh its times

use std::path::Path;

use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};

use super::{display, make_parent, require_parent};
use crate::declaration::TouchSpec;
use crate::outcome::{Plan, StateResult, changes, settle};
use crate::{Error, Result};

pub(crate) fn plan(target: &Path, spec: &TouchSpec) -> Result<Plan<bool>> {
    let name = display(target);
    match probe::probe(target)? {
        EntryKind::Missing => {
            require_parent(target, spec.makedirs)?;
            Ok(Plan::change(
                format!("File {name} would be created"),
                changes([("new", name.as_str())]),
                true,
            ))
        }
        EntryKind::File | EntryKind::Directory => Ok(Plan::change(
            format!("Times on {name} would be updated"),
            changes([("touched", name.as_str())]),
            false,
        )),
        EntryKind::Symlink { .. } if probe::symlink_resolves(target) => Ok(Plan::change(
            format!("Times on the target of {name} would be updated"),
            changes([("touched", name.as_str())]),
            false,
        )),
        found => Err(Error::type_conflict(
            target,
            "a file or directory",
            found.describe(),
        )),
    }
}

pub(crate) fn reconcile(target: &Path, spec: &TouchSpec, dry_run: bool) -> Result<StateResult> {
    let plan = plan(target, spec)?;
    settle(target, plan, dry_run, |create| {
        if create && spec.makedirs {
            make_parent(target)?;
        }
        io::touch(target, spec.mtime).map_err(|e| Error::write(target, e))?;
        Ok(if create {
            format!("Created empty file {}", target.display())
        } else {
            format!("Updated times on {}", target.display())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn spec() -> TouchSpec {
        TouchSpec {
            makedirs: false,
            mtime: None,
        }
    }

    #[test]
    fn creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("stamp");

        let result = reconcile(&file, &spec(), false).unwrap();
        assert_eq!(result.outcome, Outcome::Succeeded);
        assert!(result.changes.contains_key("new"));
        assert_eq!(fs::read(&file).unwrap(), b"");
    }

    #[test]
    fn updates_directory_mtime_without_converting() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);

        let declared = TouchSpec {
            makedirs: false,
            mtime: Some(when),
        };
        let result = reconcile(&dir, &declared, false).unwrap();

        assert!(result.changes.contains_key("touched"));
        assert!(dir.is_dir());
        assert_eq!(fs::metadata(&dir).unwrap().modified().unwrap(), when);
    }

    #[test]
    fn always_reports_would_change_in_dry_run() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("stamp");
        fs::write(&file, "keep").unwrap();
        let before = fs::metadata(&file).unwrap().modified().unwrap();

        let result = reconcile(&file, &spec(), true).unwrap();
        assert_eq!(result.outcome, Outcome::WouldChange);
        assert_eq!(fs::metadata(&file).unwrap().modified().unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_a_type_conflict() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("nowhere"), &link).unwrap();

        let err = reconcile(&link, &spec(), false).unwrap_err();
        assert!(matches!(err, Error::TypeConflict { .. }));
    }
}

//! symlink: ensure a symlink with the given link text

use std::path::Path;

use filestate_fs::probe::{self, EntryKind};
use filestate_fs::io;

use super::{display, make_parent, require_parent};
use crate::declaration::SymlinkSpec;
use crate::outcome::{Plan, StateResult, changes, settle};
use crate::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Create { makedirs: bool },
    /// Remove what is there first
    Replace,
}

pub(crate) fn plan(target: &Path, spec: &SymlinkSpec) -> Result<Plan<Action>> {
    let name = display(target);
    let link_text = spec.target.display();

    let plan = match probe::probe(target)? {
        EntryKind::Symlink { target: current } if current == spec.target => {
            Plan::converged(format!("Symlink {name} is present and points to {link_text}"))
        }
        EntryKind::Symlink { target: current } => Plan::change(
            format!(
                "Symlink {name} would be changed from {} to {link_text}",
                current.display()
            ),
            changes([("new", name.as_str())]),
            Action::Replace,
        ),
        EntryKind::Missing => {
            require_parent(target, spec.makedirs)?;
            Plan::change(
                format!("Symlink {name} to {link_text} would be created"),
                changes([("new", name.as_str())]),
                Action::Create {
                    makedirs: spec.makedirs,
                },
            )
        }
        other if spec.force => Plan::change(
            format!(
                "{} at {name} would be replaced by a symlink to {link_text}",
                capitalize(other.describe())
            ),
            changes([("new", name.as_str()), ("replaced", other.describe())]),
            Action::Replace,
        ),
        other => {
            return Err(Error::Conflict {
                path: target.to_path_buf(),
                found: other.describe().to_string(),
            });
        }
    };

    tracing::debug!(path = %name, converged = plan.is_converged(), "planned symlink");
    Ok(plan)
}

pub(crate) fn reconcile(target: &Path, spec: &SymlinkSpec, dry_run: bool) -> Result<StateResult> {
    let plan = plan(target, spec)?;
    settle(target, plan, dry_run, |action| {
        match action {
            Action::Create { makedirs } => {
                if makedirs {
                    make_parent(target)?;
                }
            }
            Action::Replace => {
                io::remove_entry(target).map_err(|e| Error::write(target, e))?;
            }
        }
        io::create_symlink(&spec.target, target).map_err(|e| Error::write(target, e))?;

        match probe::probe(target)? {
            EntryKind::Symlink { target: current } if current == spec.target => Ok(format!(
                "Created new symlink {} -> {}",
                target.display(),
                spec.target.display()
            )),
            other => Err(Error::Unconverged {
                path: target.to_path_buf(),
                message: format!("found {} after creating the symlink", other.describe()),
            }),
        }
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Outcome;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn spec(target: impl Into<PathBuf>) -> SymlinkSpec {
        SymlinkSpec {
            target: target.into(),
            force: false,
            makedirs: false,
        }
    }

    #[cfg(unix)]
    #[test]
    fn creates_then_converges() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        let declared = spec(temp.path().join("file"));

        let first = reconcile(&link, &declared, false).unwrap();
        assert_eq!(first.outcome, Outcome::Succeeded);
        assert_eq!(first.changes["new"], link.display().to_string());
        assert_eq!(fs::read_link(&link).unwrap(), temp.path().join("file"));

        let second = reconcile(&link, &declared, false).unwrap();
        assert_eq!(second.outcome, Outcome::Succeeded);
        assert!(second.changes.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn retargets_existing_symlink() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink("/elsewhere", &link).unwrap();

        reconcile(&link, &spec("/new-target"), false).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("/new-target"));
    }

    #[test]
    fn file_in_the_way_is_a_conflict_without_force() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        fs::write(&link, "data").unwrap();

        let err = reconcile(&link, &spec("/target"), false).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(fs::read_to_string(&link).unwrap(), "data");
    }

    #[cfg(unix)]
    #[test]
    fn force_replaces_directory_tree() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        fs::create_dir_all(link.join("nested")).unwrap();
        fs::write(link.join("nested/file"), "x").unwrap();

        let mut declared = spec("/target");
        declared.force = true;
        reconcile(&link, &declared, false).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("/target"));
    }

    #[test]
    fn missing_parent_needs_makedirs() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("a/b/link");

        let err = reconcile(&link, &spec("/target"), false).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));

        let mut declared = spec("/target");
        declared.makedirs = true;
        let result = reconcile(&link, &declared, true).unwrap();
        assert_eq!(result.outcome, Outcome::WouldChange);
        assert!(!temp.path().join("a").exists());
    }

    #[test]
    fn capitalizes_descriptions() {
        assert_eq!(capitalize("a file"), "A file");
        assert_eq!(capitalize(""), "");
    }
}

//! managed: ensure a file holds given content

use std::path::{Path, PathBuf};

use filestate_content::LineDiff;
use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};

use super::{display, make_parent, require_parent};
use crate::declaration::{ContentSource, ManagedSpec};
use crate::engine::{Engine, blocking};
use crate::outcome::{Decision, Plan, StateResult, changes};
use crate::{Error, Result};

/// Current content of a file target, `None` when missing.
///
/// Anything other than a regular file is a type conflict.
pub(crate) fn read_current(target: &Path) -> Result<Option<Vec<u8>>> {
    match probe::probe(target)? {
        EntryKind::Missing => Ok(None),
        EntryKind::File => Ok(Some(io::read_bytes(target)?)),
        found => Err(Error::type_conflict(target, "a file", found.describe())),
    }
}

/// Plan replacing `current` with `desired`.
pub(crate) fn plan_write(target: &Path, current: Option<&[u8]>, desired: Vec<u8>) -> Plan<Vec<u8>> {
    let name = display(target);
    match current {
        Some(existing) if existing == desired.as_slice() => {
            Plan::converged(format!("File {name} is in the correct state"))
        }
        Some(existing) => {
            let diff = match (std::str::from_utf8(existing), std::str::from_utf8(&desired)) {
                (Ok(old), Ok(new)) => LineDiff::compute(old, new, &name).unified,
                _ => "Replace binary file".to_string(),
            };
            Plan::change(
                format!("File {name} would be updated"),
                changes([("diff", diff)]),
                desired,
            )
        }
        None => Plan::change(
            format!("File {name} would be created"),
            changes([("diff", "New file")]),
            desired,
        ),
    }
}

/// Write `content` to `target` atomically and check it landed.
pub(crate) fn write_verified(target: &Path, content: &[u8], makedirs: bool) -> Result<()> {
    if makedirs {
        make_parent(target)?;
    }
    io::write_atomic(target, content).map_err(|e| Error::write(target, e))?;

    if io::read_bytes(target)? != content {
        return Err(Error::Unconverged {
            path: target.to_path_buf(),
            message: "content differs after write".to_string(),
        });
    }
    Ok(())
}

pub(crate) async fn reconcile(
    engine: &Engine,
    target: &Path,
    spec: &ManagedSpec,
    dry_run: bool,
) -> Result<StateResult> {
    let name = display(target);
    let makedirs = spec.makedirs;

    let current = {
        let target = target.to_path_buf();
        blocking(move || {
            let current = read_current(&target)?;
            if current.is_none() {
                require_parent(&target, makedirs)?;
            }
            Ok(current)
        })
        .await?
    };

    if current.is_some() && !spec.replace {
        return Ok(StateResult::unchanged(
            name.clone(),
            format!("File {name} exists and replace is disabled"),
        ));
    }
    if let (Some(hash), Some(existing)) = (spec.expected_hash(), &current) {
        if hash.matches(existing) {
            tracing::debug!(path = %name, hash = %hash, "source hash already matches");
            return Ok(StateResult::unchanged(
                name.clone(),
                format!("File {name} is in the correct state"),
            ));
        }
    }

    let desired = match &spec.source {
        ContentSource::Inline(text) => text.clone().into_bytes(),
        ContentSource::Remote(descriptor) => {
            let fetched = engine.fetch_bytes(&descriptor.uri).await?;
            if let Some(hash) = &descriptor.expected_hash {
                if !hash.matches(&fetched) {
                    let actual = hash.algorithm.digest(&fetched);
                    tracing::warn!(uri = %descriptor.uri, expected = %hash, actual, "source hash mismatch");
                    return Ok(StateResult::failed(
                        name,
                        format!(
                            "Source hash mismatch for {}: expected {}, got {actual}",
                            descriptor.uri, hash.digest
                        ),
                    ));
                }
            }
            fetched
        }
    };

    let plan = plan_write(target, current.as_deref(), desired);
    match plan.decide(target, dry_run) {
        Decision::Report(result) => Ok(result),
        Decision::Apply { action, changes } => {
            let path: PathBuf = target.to_path_buf();
            blocking(move || write_verified(&path, &action, makedirs)).await?;
            tracing::info!(path = %name, "file updated");
            Ok(StateResult::changed(
                name.clone(),
                format!("File {name} updated"),
                changes,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plan_reports_new_file() {
        let plan = plan_write(Path::new("/tmp/new"), None, b"x".to_vec());
        assert_eq!(plan.changes["diff"], "New file");
        assert!(!plan.is_converged());
    }

    #[test]
    fn plan_converges_on_equal_bytes() {
        let plan = plan_write(Path::new("/tmp/same"), Some(b"x\n"), b"x\n".to_vec());
        assert!(plan.is_converged());
    }

    #[test]
    fn plan_diffs_text_and_flags_binary() {
        let text = plan_write(Path::new("/tmp/t"), Some(b"a\n"), b"b\n".to_vec());
        assert!(text.changes["diff"].contains("+b"));

        let binary = plan_write(Path::new("/tmp/b"), Some(&[0xff, 0xfe]), vec![0x00]);
        assert_eq!(binary.changes["diff"], "Replace binary file");
    }

    #[test]
    fn directory_target_is_a_type_conflict() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read_current(temp.path()),
            Err(Error::TypeConflict { .. })
        ));
    }

    #[test]
    fn write_verified_creates_parents_when_asked() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/file");

        write_verified(&target, b"content", true).unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"content");
    }
}

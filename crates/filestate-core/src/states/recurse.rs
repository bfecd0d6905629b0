//! recurse: mirror a remote tree into a local directory

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use filestate_fs::probe::{self, EntryKind};
use filestate_fs::{TreePath, io};
use walkdir::WalkDir;

use super::managed::{plan_write, read_current, write_verified};
use super::{display, require_parent};
use crate::declaration::RecurseSpec;
use crate::engine::{Engine, blocking};
use crate::fetch::TreeEntry;
use crate::outcome::{Changes, Decision, Outcome, StateResult};
use crate::{Error, Result};

const NEW: &str = "new";
const UPDATED: &str = "updated";
const REMOVED: &str = "removed";

pub(crate) async fn reconcile(
    engine: &Engine,
    target: &Path,
    spec: &RecurseSpec,
    dry_run: bool,
) -> Result<StateResult> {
    let name = display(target);
    let mut changes = Changes::new();

    let root_exists = {
        let target = target.to_path_buf();
        let makedirs = spec.makedirs;
        blocking(move || match probe::probe(&target)? {
            EntryKind::Directory => Ok(true),
            EntryKind::Missing => {
                require_parent(&target, makedirs)?;
                Ok(false)
            }
            found => Err(Error::type_conflict(&target, "a directory", found.describe())),
        })
        .await?
    };
    if !root_exists {
        changes.insert(name.clone(), "New Dir".to_string());
        if !dry_run {
            let target = target.to_path_buf();
            blocking(move || io::create_dir_all(&target).map_err(|e| Error::write(&target, e)))
                .await?;
        }
    }

    let listing = engine.enumerate(&spec.source).await?;
    let entries = blocking(move || listing.collect::<Result<Vec<TreeEntry>>>()).await?;

    let mut remote = BTreeSet::new();
    let mut failures = 0usize;
    for entry in entries {
        if spec.is_excluded(entry.path.as_str()) {
            tracing::debug!(path = %entry.path, "excluded from sync");
            continue;
        }
        remote.insert(entry.path.clone());

        match sync_entry(engine, target, &entry, dry_run).await {
            Ok(Some(change)) => {
                changes.insert(entry.path.to_string(), change.to_string());
            }
            Ok(None) => {}
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                tracing::warn!(path = %entry.path, error = %e, "failed to sync entry");
                failures += 1;
                changes.insert(entry.path.to_string(), format!("error: {e}"));
            }
        }
    }

    if spec.clean && root_exists {
        let target = target.to_path_buf();
        let spec = spec.clone();
        let removed = blocking(move || clean(&target, &remote, &spec, dry_run)).await?;
        for path in removed {
            changes.insert(path.to_string(), REMOVED.to_string());
        }
    }

    let result = if failures > 0 {
        StateResult {
            name: name.clone(),
            outcome: Outcome::Failed,
            comment: format!("{failures} entries of {name} failed to sync"),
            changes,
        }
    } else if changes.is_empty() {
        StateResult::unchanged(name.clone(), format!("Directory {name} is in the correct state"))
    } else if dry_run {
        tracing::info!(path = %name, changes = changes.len(), "[dry-run] tree would be updated");
        StateResult::would_change(name.clone(), format!("Directory {name} would be updated"), changes)
    } else {
        tracing::info!(path = %name, changes = changes.len(), "tree updated");
        StateResult::changed(name.clone(), format!("Recursively updated {name}"), changes)
    };
    Ok(result)
}

/// Bring one file in line with its remote counterpart.
async fn sync_entry(
    engine: &Engine,
    root: &Path,
    entry: &TreeEntry,
    dry_run: bool,
) -> Result<Option<&'static str>> {
    let path = entry.path.under(root);
    // Serialize against requests declaring this entry directly
    let _guard = if dry_run {
        None
    } else {
        Some(engine.lock_path(&path).await)
    };
    let current = {
        let path = path.clone();
        blocking(move || read_current(&path)).await?
    };
    let change = if current.is_some() { UPDATED } else { NEW };

    let desired = engine.fetch_bytes(&entry.uri).await?;
    match plan_write(&path, current.as_deref(), desired).decide(&path, dry_run) {
        Decision::Report(result) if result.outcome == Outcome::Succeeded => Ok(None),
        Decision::Report(_) => Ok(Some(change)),
        Decision::Apply { action, .. } => {
            let target: PathBuf = path;
            blocking(move || write_verified(&target, &action, true)).await?;
            Ok(Some(change))
        }
    }
}

/// Remove local entries the remote tree does not have.
///
/// Excluded paths are preserved, and so is every directory that still holds
/// something after cleaning. Returns the removed (or, in dry run, removable)
/// relative paths.
fn clean(
    root: &Path,
    remote: &BTreeSet<TreePath>,
    spec: &RecurseSpec,
    dry_run: bool,
) -> Result<Vec<TreePath>> {
    let remote_dirs: HashSet<TreePath> = remote
        .iter()
        .flat_map(|path| std::iter::successors(path.parent(), TreePath::parent))
        .collect();

    let mut kept: HashSet<TreePath> = HashSet::new();
    let mut removed = Vec::new();

    // Children come before their directory, so a directory knows whether
    // anything below it survived.
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = TreePath::from_relative(relative)?;

        let known = if entry.file_type().is_dir() {
            remote_dirs.contains(&relative) || kept.contains(&relative)
        } else {
            remote.contains(&relative)
        };
        let keep = known || spec.is_excluded(relative.as_str());

        if keep {
            kept.extend(std::iter::successors(relative.parent(), TreePath::parent));
            continue;
        }

        if !dry_run {
            io::remove_entry(entry.path()).map_err(|e| Error::write(entry.path(), e))?;
        }
        tracing::debug!(path = %relative, dry_run, "cleaned");
        removed.push(relative);
    }

    Ok(removed)
}

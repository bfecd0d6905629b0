//! patch: apply a unified diff, gated on the hash of the result

use std::fs;
use std::path::{Path, PathBuf};

use filestate_fs::io;
use filestate_fs::probe::{self, EntryKind};
use tempfile::TempDir;

use super::display;
use super::managed::write_verified;
use crate::declaration::PatchSpec;
use crate::engine::{Engine, blocking};
use crate::outcome::{StateResult, changes};
use crate::{Error, Result};

pub(crate) const ALREADY_APPLIED: &str = "Patch is already applied";

/// Scratch copies the interpreter works on, removed on drop
struct Staging {
    _dir: TempDir,
    patch: PathBuf,
    original: PathBuf,
    patched: PathBuf,
}

impl Staging {
    fn create(target: &Path, patch: &[u8]) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let staging = Self {
            patch: dir.path().join("change.patch"),
            original: dir.path().join("original"),
            patched: dir.path().join("patched"),
            _dir: dir,
        };
        fs::write(&staging.patch, patch)?;
        fs::copy(target, &staging.original).map_err(|e| filestate_fs::Error::io(target, e))?;
        Ok(staging)
    }
}

pub(crate) async fn reconcile(
    engine: &Engine,
    target: &Path,
    spec: &PatchSpec,
    dry_run: bool,
) -> Result<StateResult> {
    let name = display(target);
    let patch = engine.fetch_bytes(&spec.source.uri).await?;

    let applied = {
        let target = target.to_path_buf();
        let hash = spec.hash.clone();
        blocking(move || match probe::probe(&target)? {
            EntryKind::File => Ok(hash.matches_file(&target)?),
            EntryKind::Missing => Err(Error::PathNotFound { path: target }),
            found => Err(Error::type_conflict(&target, "a file", found.describe())),
        })
        .await?
    };
    if applied {
        tracing::debug!(path = %name, hash = %spec.hash, "target already at patched hash");
        return Ok(StateResult::unchanged(name, ALREADY_APPLIED));
    }

    let patcher = engine.patcher();
    if !patcher.is_available().await {
        return Err(Error::ToolUnavailable {
            tool: patcher.name().to_string(),
        });
    }

    let staging = {
        let target = target.to_path_buf();
        blocking(move || Staging::create(&target, &patch)).await?
    };

    if dry_run {
        let report = patcher
            .check(&staging.patch, &staging.original, &spec.options)
            .await?;
        tracing::info!(path = %name, "[dry-run] patch would be applied");
        return Ok(StateResult::would_change(
            name,
            "The patch would be applied",
            changes([("patch", report)]),
        ));
    }

    let report = patcher
        .apply(
            &staging.patch,
            &staging.original,
            &staging.patched,
            &spec.options,
        )
        .await?;

    let target = target.to_path_buf();
    let hash = spec.hash.clone();
    let matched = blocking(move || {
        let patched = io::read_bytes(&staging.patched)?;
        if !hash.matches(&patched) {
            return Ok(false);
        }
        write_verified(&target, &patched, false)?;
        Ok(true)
    })
    .await?;

    if !matched {
        tracing::warn!(path = %name, expected = %spec.hash, "hash mismatch after patching");
        return Ok(StateResult::failed(
            name.clone(),
            format!("File {name} hash mismatch after patch was applied"),
        ));
    }

    tracing::info!(path = %name, "patch applied");
    Ok(StateResult::changed(
        name,
        "Patch successfully applied",
        changes([("patch", report)]),
    ))
}

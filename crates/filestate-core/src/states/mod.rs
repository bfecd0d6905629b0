//! State resolvers, one module per kind
//!
//! Local resolvers (`symlink`, `absent`, `directory`, `touch` and the text
//! mutators) are synchronous and run on the blocking pool. Resolvers that
//! fetch content (`managed`, `recurse`, `patch`) are async and borrow the
//! engine for its fetcher, patch interpreter and timeout.

pub(crate) mod absent;
pub(crate) mod directory;
pub(crate) mod managed;
pub(crate) mod patch;
pub(crate) mod recurse;
pub(crate) mod symlink;
pub(crate) mod text;
pub(crate) mod touch;

use std::path::Path;

use filestate_fs::io;

use crate::{Error, Result};

/// Display name of a target, used for result names and comments.
pub(crate) fn display(target: &Path) -> String {
    target.display().to_string()
}

/// Fail with `PathNotFound` when the parent of `target` is missing and may
/// not be created.
pub(crate) fn require_parent(target: &Path, makedirs: bool) -> Result<()> {
    if makedirs || filestate_fs::probe::parent_exists(target) {
        return Ok(());
    }
    Err(Error::PathNotFound {
        path: target.parent().unwrap_or(target).to_path_buf(),
    })
}

/// Create the parent of `target` and its ancestors.
pub(crate) fn make_parent(target: &Path) -> Result<()> {
    match target.parent() {
        Some(parent) if !parent.is_dir() => {
            io::create_dir_all(parent).map_err(|e| Error::write(parent, e))
        }
        _ => Ok(()),
    }
}

//! Filesystem probing
//!
//! Classifies whatever currently sits at a path without following symlinks.
//! Resolvers plan against the returned [`EntryKind`], so planning logic can
//! be exercised with plain values.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// What exists at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Nothing at the path
    Missing,
    /// A regular file
    File,
    /// A directory
    Directory,
    /// A symlink and its link text (not resolved)
    Symlink { target: PathBuf },
    /// Fifo, socket, device or anything else
    Other,
}

impl EntryKind {
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// Short human name for comments and error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Missing => "nothing",
            Self::File => "a file",
            Self::Directory => "a directory",
            Self::Symlink { .. } => "a symlink",
            Self::Other => "a special file",
        }
    }
}

/// Classify `path` using `symlink_metadata`.
pub fn probe(path: &Path) -> Result<EntryKind> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(EntryKind::Missing),
        Err(e) => return Err(Error::io(path, e)),
    };

    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
        let target = fs::read_link(path).map_err(|e| Error::io(path, e))?;
        EntryKind::Symlink { target }
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };

    tracing::trace!(path = %path.display(), kind = kind.describe(), "probed");
    Ok(kind)
}

/// Whether the parent directory of `path` exists (following symlinks).
///
/// Paths without a parent component are treated as rooted in the current
/// directory, which always exists.
pub fn parent_exists(path: &Path) -> bool {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
        _ => true,
    }
}

/// Whether a symlink at `path` resolves to something that exists.
pub fn symlink_resolves(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

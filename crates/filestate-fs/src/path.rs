//! Relative paths inside a synchronized tree

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A relative path normalized to forward slashes.
///
/// Tree entries from a fetcher are keyed by `TreePath` so results read the
/// same on every platform. Construction rejects absolute paths and `..`
/// components, so joining a `TreePath` under a root can never escape it.
/// Conversion to a platform-native path happens only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath {
    /// Always `/`-separated, no empty or `.` segments
    inner: String,
}

impl TreePath {
    /// Parse and normalize a relative path.
    ///
    /// Backslashes become forward slashes; empty and `.` segments are
    /// dropped.
    pub fn parse(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref();
        let invalid = |reason: &str| Error::InvalidTreePath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let normalized = raw.replace('\\', "/");
        if normalized.starts_with('/') || has_drive_prefix(&normalized) {
            return Err(invalid("path is absolute"));
        }

        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(invalid("parent components are not allowed")),
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(invalid("path is empty"));
        }

        Ok(Self {
            inner: segments.join("/"),
        })
    }

    /// Build from a path known to be relative to some root, e.g. a walk
    /// result with the root prefix stripped.
    pub fn from_relative(path: &Path) -> Result<Self> {
        Self::parse(path.to_string_lossy())
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/')
    }

    /// Join a child segment path.
    pub fn join(&self, child: &TreePath) -> Self {
        Self {
            inner: format!("{}/{}", self.inner, child.inner),
        }
    }

    /// Parent path, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<Self> {
        self.inner.rsplit_once('/').map(|(parent, _)| Self {
            inner: parent.to_string(),
        })
    }

    /// Platform-native path of this entry under `root`.
    pub fn under(&self, root: &Path) -> PathBuf {
        self.segments().fold(root.to_path_buf(), |acc, s| acc.join(s))
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for TreePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

//! Atomic I/O operations with file locking

use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fs2::FileExt;

use crate::probe::{self, EntryKind};
use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// The content goes to a temp file in the same directory and is renamed
/// over `path`, so readers see either the old or the new content. When
/// `path` already exists its permissions are carried over and an advisory
/// exclusive lock is held on it until the rename is done.
///
/// The parent directory must exist.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = parent_dir(path);

    let existing = match File::open(path) {
        Ok(file) => Some(file),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(Error::io(path, e)),
    };

    let permissions = match &existing {
        Some(file) => {
            file.lock_exclusive().map_err(|_| Error::LockFailed {
                path: path.to_path_buf(),
            })?;
            Some(file.metadata().map_err(|e| Error::io(path, e))?.permissions())
        }
        None => None,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::io(&parent, e))?;

    temp.write_all(content)
        .map_err(|e| Error::io(temp.path(), e))?;
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::io(temp.path(), e))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;

    // Lock on the replaced inode is released when `existing` drops.
    drop(existing);
    tracing::trace!(path = %path.display(), bytes = content.len(), "wrote atomically");
    Ok(())
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Read the full content of a file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Create a directory and all missing ancestors.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Remove whatever is at `path`.
///
/// Directories are removed recursively; symlinks are unlinked and never
/// followed. Returns `false` when nothing was there.
pub fn remove_entry(path: &Path) -> Result<bool> {
    match probe::probe(path)? {
        EntryKind::Missing => Ok(false),
        EntryKind::Directory => {
            fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
            Ok(true)
        }
        EntryKind::File | EntryKind::Symlink { .. } | EntryKind::Other => {
            fs::remove_file(path).map_err(|e| Error::io(path, e))?;
            Ok(true)
        }
    }
}

/// Create a symlink at `link` whose link text is `target`.
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);

    #[cfg(windows)]
    let result = if link
        .parent()
        .map(|parent| parent.join(target).is_dir())
        .unwrap_or(false)
    {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(|e| Error::io(link, e))
}

/// Create an empty file if missing, then set its access time to now and
/// its modification time to `mtime` (default now).
///
/// Existing entries are opened read-only, so directories keep being
/// directories.
pub fn touch(path: &Path, mtime: Option<SystemTime>) -> Result<()> {
    let file = if probe::probe(path)?.exists() {
        File::open(path)
    } else {
        OpenOptions::new().write(true).create(true).truncate(false).open(path)
    }
    .map_err(|e| Error::io(path, e))?;

    let now = SystemTime::now();
    let times = FileTimes::new()
        .set_accessed(now)
        .set_modified(mtime.unwrap_or(now));
    file.set_times(times).map_err(|e| Error::io(path, e))
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_atomic_requires_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("file.txt");

        let err = write_atomic(&path, b"x").unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn write_atomic_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("script.sh");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).unwrap();

        write_atomic(&path, b"new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn remove_entry_reports_missing() {
        let temp = TempDir::new().unwrap();
        assert!(!remove_entry(&temp.path().join("none")).unwrap());
    }

    #[test]
    fn touch_sets_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("stamp");
        let when = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);

        touch(&path, Some(when)).unwrap();

        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, when);
    }
}

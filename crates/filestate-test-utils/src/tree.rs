//! [`TestTree`] builder for filesystem scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tempfile::TempDir;
use walkdir::WalkDir;

/// What a snapshot records for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File {
        content: Vec<u8>,
        modified: SystemTime,
    },
    Dir {
        modified: SystemTime,
    },
    Symlink {
        target: PathBuf,
    },
}

/// A temporary directory with helper methods for test setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use filestate_test_utils::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("etc/motd", "hello\n");
/// tree.assert_file_contains("etc/motd", "hello");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the tree.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[cfg(unix)]
    pub fn symlink(&self, relative: &str, target: impl AsRef<Path>) -> PathBuf {
        let path = self.path(relative);
        std::os::unix::fs::symlink(target, &path).unwrap();
        path
    }

    pub fn read(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Record every entry below the root, without following symlinks.
    ///
    /// Two snapshots compare equal only if no file, directory or link was
    /// created, removed, rewritten or touched in between.
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Entry> {
        WalkDir::new(self.root())
            .follow_links(false)
            .into_iter()
            .map(|entry| {
                let entry = entry.unwrap();
                let path = entry.path().strip_prefix(self.root()).unwrap().to_path_buf();
                let metadata = entry.path().symlink_metadata().unwrap();
                let recorded = if metadata.file_type().is_symlink() {
                    Entry::Symlink {
                        target: fs::read_link(entry.path()).unwrap(),
                    }
                } else if metadata.is_dir() {
                    Entry::Dir {
                        modified: metadata.modified().unwrap(),
                    }
                } else {
                    Entry::File {
                        content: fs::read(entry.path()).unwrap(),
                        modified: metadata.modified().unwrap(),
                    }
                };
                (path, recorded)
            })
            .collect()
    }

    /// Relative paths of every entry, `/`-separated, sorted.
    pub fn listing(&self) -> Vec<String> {
        self.snapshot()
            .keys()
            .filter(|path| !path.as_os_str().is_empty())
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    pub fn assert_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(
            path.symlink_metadata().is_ok(),
            "Expected path to exist: {}",
            path.display()
        );
    }

    pub fn assert_not_exists(&self, relative: &str) {
        let path = self.path(relative);
        assert!(
            path.symlink_metadata().is_err(),
            "Expected path NOT to exist: {}",
            path.display()
        );
    }

    pub fn assert_file_contains(&self, relative: &str, content: &str) {
        let file_content = self.read(relative);
        assert!(
            file_content.contains(content),
            "File {relative} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}

//! Paths into the checked-in `test-fixtures/` directory.

use std::path::PathBuf;
use std::process::{Command, Stdio};

/// `test-fixtures/file-roots`, the file root used by end-to-end tests.
///
/// Holds `grail/scene33`, `grail/36/scene`, `hello.patch` and
/// `hello_dolly.patch`.
pub fn file_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/file-roots")
        .canonicalize()
        .expect("test-fixtures/file-roots must exist")
}

/// Whether a GNU-compatible `patch` is on `PATH`.
///
/// Tests that drive the real interpreter skip themselves when this is false.
pub fn patch_available() -> bool {
    Command::new("patch")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

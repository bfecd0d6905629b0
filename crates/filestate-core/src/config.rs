//! Engine configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use filestate_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Settings shared by every request an [`Engine`](crate::Engine) handles.
///
/// Every field has a default, so an empty file is a valid configuration:
///
/// ```toml
/// file_roots = ["/srv/filestate"]
/// fetch_timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Roots searched, in order, for `fs://` sources
    pub file_roots: Vec<PathBuf>,
    /// Upper bound on a single fetch
    pub fetch_timeout_secs: u64,
    /// Program used to apply patches
    pub patch_program: String,
    /// Marker used by comment/uncomment when `char` is not given
    pub comment_char: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            file_roots: Vec::new(),
            fetch_timeout_secs: 30,
            patch_program: "patch".to_string(),
            comment_char: "#".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML, JSON or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn with_file_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.file_roots.push(root.into());
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

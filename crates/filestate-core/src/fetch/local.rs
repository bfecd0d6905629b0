//! Fetcher backed by local file roots

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use filestate_fs::TreePath;
use walkdir::WalkDir;

use super::{ByteStream, Fetcher, TreeEntry, TreeListing};
use crate::{Error, Result};

const ROOT_SCHEME: &str = "fs://";
const FILE_SCHEME: &str = "file://";

/// Serves `fs://` URIs from an ordered list of roots, plus `file://` and
/// bare absolute paths from anywhere on disk.
#[derive(Debug, Clone, Default)]
pub struct LocalFetcher {
    roots: Vec<PathBuf>,
}

impl LocalFetcher {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Map a URI to the local path it names.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf> {
        if let Some(relative) = uri.strip_prefix(ROOT_SCHEME) {
            let relative = TreePath::parse(relative).map_err(|e| Error::fetch(uri, e))?;
            return self
                .roots
                .iter()
                .map(|root| relative.under(root))
                .find(|candidate| candidate.symlink_metadata().is_ok())
                .ok_or_else(|| Error::fetch(uri, "not found in any file root"));
        }

        let path = Path::new(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri));
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Err(Error::fetch(
                uri,
                "expected fs://<relative>, file://<absolute> or an absolute path",
            ))
        }
    }
}

#[async_trait]
impl Fetcher for LocalFetcher {
    async fn fetch(&self, uri: &str) -> Result<ByteStream> {
        let path = self.resolve(uri)?;
        tracing::debug!(uri, path = %path.display(), "opening local source");

        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| Error::fetch(uri, e))?;
        let metadata = file.metadata().await.map_err(|e| Error::fetch(uri, e))?;
        if !metadata.is_file() {
            return Err(Error::fetch(uri, "not a regular file"));
        }
        Ok(Box::pin(file))
    }

    async fn enumerate(&self, uri: &str) -> Result<TreeListing> {
        let root = self.resolve(uri)?;
        if !root.is_dir() {
            return Err(Error::fetch(uri, "not a directory"));
        }
        tracing::debug!(uri, root = %root.display(), "walking local tree");

        let source = uri.to_string();
        let walk = WalkDir::new(&root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        let entries = walk.filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::fetch(&*source, e))),
            };
            if !entry.file_type().is_file() {
                return None;
            }
            let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            Some(
                TreePath::from_relative(relative)
                    .map(|path| TreeEntry {
                        path,
                        uri: format!("{FILE_SCHEME}{}", entry.path().display()),
                    })
                    .map_err(|e| Error::fetch(&*source, e)),
            )
        });

        Ok(TreeListing::new(entries))
    }
}

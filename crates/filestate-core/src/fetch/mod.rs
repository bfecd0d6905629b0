//! Remote resource fetching
//!
//! The engine never resolves sources itself. It asks a [`Fetcher`] for a byte
//! stream (managed, patch) or for the listing of a tree (recurse). The
//! default implementation, [`LocalFetcher`], serves files from configured
//! roots on the local disk.

mod local;

pub use local::LocalFetcher;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use filestate_fs::{HashSpec, TreePath};
use tokio::io::AsyncRead;

use crate::Result;

/// Content of a fetched resource
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Source of remote content.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Open the resource at `uri`.
    async fn fetch(&self, uri: &str) -> Result<ByteStream>;

    /// List every file below the tree at `uri`.
    ///
    /// Entry URIs must be accepted by [`Fetcher::fetch`].
    async fn enumerate(&self, uri: &str) -> Result<TreeListing>;
}

/// One file of a remote tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Position relative to the tree root
    pub path: TreePath,
    pub uri: String,
}

/// Lazy, finite sequence of tree entries
pub struct TreeListing {
    entries: Box<dyn Iterator<Item = Result<TreeEntry>> + Send>,
}

impl TreeListing {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Result<TreeEntry>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            entries: Box::new(entries.into_iter()),
        }
    }
}

impl Iterator for TreeListing {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }
}

impl fmt::Debug for TreeListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeListing").finish_non_exhaustive()
    }
}

/// Where content comes from and what it must hash to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub uri: String,
    pub expected_hash: Option<HashSpec>,
}

impl ContentDescriptor {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            expected_hash: None,
        }
    }

    pub fn with_hash(mut self, hash: HashSpec) -> Self {
        self.expected_hash = Some(hash);
        self
    }
}

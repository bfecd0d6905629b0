//! In-memory [`Fetcher`] for engine tests.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use filestate_core::{ByteStream, Error, Fetcher, Result, TreeEntry, TreeListing};
use filestate_fs::TreePath;

/// Serves resources from a map of URI to bytes.
///
/// Trees are plain URI prefixes: enumerating `mem://tree` lists every
/// resource whose URI starts with `mem://tree/`.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: BTreeMap<String, Vec<u8>>,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, uri: &str, content: impl AsRef<[u8]>) -> Self {
        self.resources
            .insert(uri.to_string(), content.as_ref().to_vec());
        self
    }

    /// Sleep this long before answering any fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of successful `fetch` calls so far, shared between clones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, uri: &str) -> Result<ByteStream> {
        self.wait().await;
        let content = self
            .resources
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::fetch(uri, "no such resource"))?;
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(Cursor::new(content)))
    }

    async fn enumerate(&self, uri: &str) -> Result<TreeListing> {
        self.wait().await;
        let prefix = format!("{}/", uri.trim_end_matches('/'));
        let entries: Vec<Result<TreeEntry>> = self
            .resources
            .keys()
            .filter_map(|key| {
                let relative = key.strip_prefix(&prefix)?;
                Some(
                    TreePath::parse(relative)
                        .map(|path| TreeEntry {
                            path,
                            uri: key.clone(),
                        })
                        .map_err(Error::from),
                )
            })
            .collect();

        if entries.is_empty() {
            return Err(Error::fetch(uri, "no such tree"));
        }
        Ok(TreeListing::new(entries))
    }
}

//! The reconciliation engine

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;

use crate::config::EngineConfig;
use crate::declaration::Declaration;
use crate::fetch::{Fetcher, LocalFetcher, TreeListing};
use crate::lock::{PathGuard, PathLocks};
use crate::outcome::StateResult;
use crate::patcher::{GnuPatch, PatchInterpreter};
use crate::request::StateRequest;
use crate::states::{absent, directory, managed, patch, recurse, symlink, text, touch};
use crate::{Error, Result};

/// Reconciles declarations against the local filesystem.
///
/// Cheap to clone; clones share the fetcher, the patch interpreter and the
/// per-path lock table. Requests on disjoint paths run concurrently, while
/// mutations of the same path are serialized.
///
/// # Example
///
/// ```no_run
/// use filestate_core::{Engine, EngineConfig, StateKind, StateRequest};
///
/// # async fn example() {
/// let engine = Engine::new(EngineConfig::default());
/// let request = StateRequest::new(StateKind::Append, "/etc/motd")
///     .with_param("text", "Authorized use only")
///     .dry_run(true);
///
/// let result = engine.reconcile(request).await;
/// println!("{}: {}", result.outcome, result.comment);
/// # }
/// ```
#[derive(Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    fetcher: Arc<dyn Fetcher>,
    patcher: Arc<dyn PatchInterpreter>,
    locks: Arc<PathLocks>,
    fetch_timeout: Duration,
}

impl Engine {
    /// Engine with a [`LocalFetcher`] over `config.file_roots` and GNU patch.
    pub fn new(config: EngineConfig) -> Self {
        let fetcher = LocalFetcher::new(config.file_roots.clone());
        let patcher = GnuPatch::new(config.patch_program.clone());
        Self {
            fetch_timeout: config.fetch_timeout(),
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            patcher: Arc::new(patcher),
            locks: Arc::new(PathLocks::new()),
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn with_patcher(mut self, patcher: impl PatchInterpreter + 'static) -> Self {
        self.patcher = Arc::new(patcher);
        self
    }

    /// Override the configured fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of paths currently locked for mutation.
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    /// Reconcile one declaration, folding any error into a failed result.
    pub async fn reconcile(&self, request: StateRequest) -> StateResult {
        let name = request.target().display().to_string();
        let kind = request.kind();
        match self.execute(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(kind = %kind, path = %name, error = %e, "state failed");
                StateResult::failed(name, e.to_string())
            }
        }
    }

    /// Reconcile one declaration, surfacing errors.
    ///
    /// Parameters are validated before the filesystem is probed. Outside dry
    /// run the target path stays locked until the result is known.
    pub async fn execute(&self, request: StateRequest) -> Result<StateResult> {
        let kind = request.kind();
        let dry_run = request.is_dry_run();
        let target = request.target().to_path_buf();
        let declaration = Declaration::parse(kind, &target, request.parameters(), &self.config)?;

        let _guard = if dry_run {
            None
        } else {
            Some(self.locks.lock(&target).await)
        };
        tracing::debug!(kind = %kind, path = %target.display(), dry_run, "reconciling");

        let result = match declaration {
            Declaration::Symlink(spec) => {
                blocking(move || symlink::reconcile(&target, &spec, dry_run)).await?
            }
            Declaration::Absent => blocking(move || absent::reconcile(&target, dry_run)).await?,
            Declaration::Directory(spec) => {
                blocking(move || directory::reconcile(&target, &spec, dry_run)).await?
            }
            Declaration::Touch(spec) => {
                blocking(move || touch::reconcile(&target, &spec, dry_run)).await?
            }
            Declaration::Sed(sed) => blocking(move || text::sed(&target, &sed, dry_run)).await?,
            Declaration::Comment(commenter) => {
                blocking(move || text::comment(&target, &commenter, dry_run)).await?
            }
            Declaration::Uncomment(commenter) => {
                blocking(move || text::uncomment(&target, &commenter, dry_run)).await?
            }
            Declaration::Append(spec) => {
                blocking(move || text::append(&target, &spec, dry_run)).await?
            }
            Declaration::Managed(spec) => managed::reconcile(self, &target, &spec, dry_run).await?,
            Declaration::Recurse(spec) => recurse::reconcile(self, &target, &spec, dry_run).await?,
            Declaration::Patch(spec) => patch::reconcile(self, &target, &spec, dry_run).await?,
        };

        tracing::debug!(
            kind = %kind,
            path = %result.name,
            outcome = %result.outcome,
            changes = result.changes.len(),
            "reconciled"
        );
        Ok(result)
    }

    /// Fetch `uri` into memory, bounded by the fetch timeout.
    pub(crate) async fn fetch_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let read = async {
            let mut stream = self.fetcher.fetch(uri).await?;
            let mut content = Vec::new();
            stream
                .read_to_end(&mut content)
                .await
                .map_err(|e| Error::fetch(uri, e))?;
            Ok::<_, Error>(content)
        };

        let content = self.bounded(uri, read).await?;
        tracing::debug!(uri, bytes = content.len(), "fetched");
        Ok(content)
    }

    /// Lock one path for mutation, for states that write below their target.
    pub(crate) async fn lock_path(&self, path: &std::path::Path) -> PathGuard {
        self.locks.lock(path).await
    }

    /// List the tree at `uri`, bounded by the fetch timeout.
    pub(crate) async fn enumerate(&self, uri: &str) -> Result<TreeListing> {
        self.bounded(uri, self.fetcher.enumerate(uri)).await
    }

    pub(crate) fn patcher(&self) -> &dyn PatchInterpreter {
        self.patcher.as_ref()
    }

    async fn bounded<T>(&self, uri: &str, work: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.fetch_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout {
                uri: uri.to_string(),
                timeout: self.fetch_timeout,
            }),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("patcher", &self.patcher.name())
            .finish_non_exhaustive()
    }
}

/// Run filesystem work on the blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Internal {
            message: e.to_string(),
        })?
}

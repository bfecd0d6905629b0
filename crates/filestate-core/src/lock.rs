//! Per-path mutation locks
//!
//! Two requests targeting the same path must not interleave their
//! read-plan-write cycles. The table hands out one async mutex per path and
//! forgets entries as soon as the last guard for a path is dropped, so the
//! table never outgrows the set of in-flight mutations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock table keyed by target path
#[derive(Debug, Default)]
pub struct PathLocks {
    table: Mutex<HashMap<PathBuf, Weak<AsyncMutex<()>>>>,
}

/// Held while a path is being mutated
#[derive(Debug)]
pub struct PathGuard {
    _guard: OwnedMutexGuard<()>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other request is mutating `path`.
    pub async fn lock(&self, path: &Path) -> PathGuard {
        let mutex = self.entry(path);
        PathGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of paths with a live lock.
    pub fn len(&self) -> usize {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.values().filter(|weak| weak.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.retain(|_, weak| weak.strong_count() > 0);

        if let Some(existing) = table.get(path).and_then(Weak::upgrade) {
            return existing;
        }
        let mutex = Arc::new(AsyncMutex::new(()));
        table.insert(path.to_path_buf(), Arc::downgrade(&mutex));
        mutex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_path_is_serialized() {
        let locks = Arc::new(PathLocks::new());
        let guard = locks.lock(Path::new("/tmp/a")).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock(Path::new("/tmp/a")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn disjoint_paths_do_not_block() {
        let locks = PathLocks::new();
        let _a = locks.lock(Path::new("/tmp/a")).await;
        let _b = locks.lock(Path::new("/tmp/b")).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn entries_are_dropped_when_unused() {
        let locks = PathLocks::new();
        {
            let _guard = locks.lock(Path::new("/tmp/a")).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }
}

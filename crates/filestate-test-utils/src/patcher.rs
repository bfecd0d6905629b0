//! Scripted [`PatchInterpreter`] for engine tests.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use filestate_core::{Error, PatchInterpreter, Result};

#[derive(Debug, Clone)]
enum Behavior {
    /// Write these bytes as the patched output
    Produce(Vec<u8>),
    Reject,
    Unavailable,
}

/// Pretends to apply patches.
///
/// Instead of interpreting the diff it writes a fixed result, rejects every
/// patch, or reports itself missing. Calls are counted across clones.
#[derive(Debug, Clone)]
pub struct FakePatcher {
    behavior: Behavior,
    checks: Arc<AtomicUsize>,
    applies: Arc<AtomicUsize>,
}

impl FakePatcher {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            checks: Arc::default(),
            applies: Arc::default(),
        }
    }

    /// Every apply yields `output`.
    pub fn producing(output: impl AsRef<[u8]>) -> Self {
        Self::with_behavior(Behavior::Produce(output.as_ref().to_vec()))
    }

    pub fn rejecting() -> Self {
        Self::with_behavior(Behavior::Reject)
    }

    pub fn unavailable() -> Self {
        Self::with_behavior(Behavior::Unavailable)
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn apply_count(&self) -> usize {
        self.applies.load(Ordering::SeqCst)
    }

    fn outcome(&self) -> Result<()> {
        match &self.behavior {
            Behavior::Produce(_) => Ok(()),
            Behavior::Reject => Err(Error::PatchRejected {
                message: "1 out of 1 hunk FAILED".to_string(),
            }),
            Behavior::Unavailable => Err(Error::ToolUnavailable {
                tool: self.name().to_string(),
            }),
        }
    }
}

#[async_trait]
impl PatchInterpreter for FakePatcher {
    fn name(&self) -> &str {
        "fake-patch"
    }

    async fn is_available(&self) -> bool {
        !matches!(self.behavior, Behavior::Unavailable)
    }

    async fn check(&self, _patch: &Path, target: &Path, _options: &[String]) -> Result<String> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.outcome()?;
        Ok(format!("checking file {}", target.display()))
    }

    async fn apply(
        &self,
        _patch: &Path,
        target: &Path,
        output: &Path,
        _options: &[String],
    ) -> Result<String> {
        self.applies.fetch_add(1, Ordering::SeqCst);
        self.outcome()?;
        if let Behavior::Produce(content) = &self.behavior {
            fs::write(output, content)?;
        }
        Ok(format!("patching file {}", target.display()))
    }
}

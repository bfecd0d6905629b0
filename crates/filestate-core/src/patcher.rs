//! Patch interpreters

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Applies unified diffs to files.
#[async_trait]
pub trait PatchInterpreter: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Whether the interpreter can be run at all.
    async fn is_available(&self) -> bool;

    /// Validate that `patch` applies to `target` without writing anything.
    async fn check(&self, patch: &Path, target: &Path, options: &[String]) -> Result<String>;

    /// Apply `patch` to `target`, writing the result to `output`.
    ///
    /// `target` itself is never modified. Returns the interpreter's report.
    async fn apply(
        &self,
        patch: &Path,
        target: &Path,
        output: &Path,
        options: &[String],
    ) -> Result<String>;
}

/// Runs GNU `patch` as a subprocess.
#[derive(Debug, Clone)]
pub struct GnuPatch {
    program: String,
}

impl GnuPatch {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: Vec<String>) -> Result<String> {
        tracing::debug!(program = %self.program, ?args, "running patch interpreter");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|_| Error::ToolUnavailable {
                tool: self.program.clone(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        let message = [stdout, stderr]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        // patch exits 1 when hunks fail and 2 on malformed input
        match output.status.code() {
            Some(1) => Err(Error::PatchRejected { message }),
            _ => Err(Error::PatchFormat { message }),
        }
    }
}

impl Default for GnuPatch {
    fn default() -> Self {
        Self::new("patch")
    }
}

#[async_trait]
impl PatchInterpreter for GnuPatch {
    fn name(&self) -> &str {
        &self.program
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    async fn check(&self, patch: &Path, target: &Path, options: &[String]) -> Result<String> {
        let mut args = vec![
            "--batch".to_string(),
            "--forward".to_string(),
            "--dry-run".to_string(),
            format!("--input={}", patch.display()),
        ];
        args.extend(options.iter().cloned());
        args.push(target.display().to_string());
        self.run(args).await
    }

    async fn apply(
        &self,
        patch: &Path,
        target: &Path,
        output: &Path,
        options: &[String],
    ) -> Result<String> {
        let mut args = vec![
            "--batch".to_string(),
            "--forward".to_string(),
            "--reject-file=-".to_string(),
            format!("--input={}", patch.display()),
            format!("--output={}", output.display()),
        ];
        args.extend(options.iter().cloned());
        args.push(target.display().to_string());
        self.run(args).await
    }
}

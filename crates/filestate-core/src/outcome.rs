//! Result protocol shared by every state
//!
//! Each resolver computes a [`Plan`] from the current filesystem state. The
//! plan is either converged (nothing to do) or carries an action. Turning a
//! plan into a [`Decision`] is the single place where dry-run semantics live:
//! a converged plan reports success, a pending action reports
//! [`Outcome::WouldChange`] in dry-run mode and is handed back for execution
//! otherwise.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// What happened (or would happen) to a declared entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The entity matches the declaration, possibly after a mutation
    Succeeded,
    /// The entity could not be converged
    Failed,
    /// Dry run only: a mutation would be performed
    WouldChange,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::WouldChange => "would change",
        })
    }
}

/// Description of applied or pending changes, keyed by aspect
pub type Changes = BTreeMap<String, String>;

/// The result of reconciling one declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResult {
    /// Target path of the declaration
    pub name: String,
    pub outcome: Outcome,
    /// Human-readable explanation
    pub comment: String,
    /// Empty when nothing changed
    pub changes: Changes,
}

impl StateResult {
    /// Success without changes: the entity was already converged.
    pub fn unchanged(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Succeeded,
            comment: comment.into(),
            changes: Changes::new(),
        }
    }

    /// Success after applying `changes`.
    pub fn changed(name: impl Into<String>, comment: impl Into<String>, changes: Changes) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Succeeded,
            comment: comment.into(),
            changes,
        }
    }

    pub fn would_change(
        name: impl Into<String>,
        comment: impl Into<String>,
        changes: Changes,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::WouldChange,
            comment: comment.into(),
            changes,
        }
    }

    pub fn failed(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: Outcome::Failed,
            comment: comment.into(),
            changes: Changes::new(),
        }
    }

    /// Tri-state view: `Some(true)` succeeded, `Some(false)` failed,
    /// `None` would change.
    pub fn result(&self) -> Option<bool> {
        match self.outcome {
            Outcome::Succeeded => Some(true),
            Outcome::Failed => Some(false),
            Outcome::WouldChange => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Diff between current and declared state, with the action that closes it
#[derive(Debug)]
pub struct Plan<A> {
    /// Explains the pending change, or why nothing is needed
    pub comment: String,
    pub changes: Changes,
    /// `None` when already converged
    pub action: Option<A>,
}

impl<A> Plan<A> {
    pub fn converged(comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            changes: Changes::new(),
            action: None,
        }
    }

    pub fn change(comment: impl Into<String>, changes: Changes, action: A) -> Self {
        Self {
            comment: comment.into(),
            changes,
            action: Some(action),
        }
    }

    pub fn is_converged(&self) -> bool {
        self.action.is_none()
    }

    /// Resolve the plan against dry-run mode.
    pub fn decide(self, target: &Path, dry_run: bool) -> Decision<A> {
        let name = target.display().to_string();
        match self.action {
            None => Decision::Report(StateResult::unchanged(name, self.comment)),
            Some(_) if dry_run => {
                tracing::info!(path = %name, "[dry-run] {}", self.comment);
                Decision::Report(StateResult::would_change(name, self.comment, self.changes))
            }
            Some(action) => Decision::Apply {
                action,
                changes: self.changes,
            },
        }
    }
}

/// What to do with a plan
#[derive(Debug)]
pub enum Decision<A> {
    /// Final result; nothing may be mutated
    Report(StateResult),
    /// Perform `action`; `changes` describes it for the final result
    Apply { action: A, changes: Changes },
}

/// Resolve `plan` and, outside dry run, perform its action.
///
/// `apply` returns the comment describing what was done. Any error it
/// raises is propagated unchanged.
pub fn settle<A, F>(target: &Path, plan: Plan<A>, dry_run: bool, apply: F) -> Result<StateResult>
where
    F: FnOnce(A) -> Result<String>,
{
    match plan.decide(target, dry_run) {
        Decision::Report(result) => Ok(result),
        Decision::Apply { action, changes } => {
            let comment = apply(action)?;
            tracing::info!(path = %target.display(), "{comment}");
            Ok(StateResult::changed(
                target.display().to_string(),
                comment,
                changes,
            ))
        }
    }
}

/// Build a [`Changes`] map from key/value pairs.
pub fn changes<K, V, I>(pairs: I) -> Changes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

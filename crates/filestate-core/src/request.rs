//! State requests

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

/// The kinds of state the engine can reconcile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateKind {
    Symlink,
    Absent,
    Managed,
    Directory,
    Recurse,
    Sed,
    Comment,
    Uncomment,
    Append,
    Touch,
    Patch,
}

impl StateKind {
    pub const ALL: [StateKind; 11] = [
        Self::Symlink,
        Self::Absent,
        Self::Managed,
        Self::Directory,
        Self::Recurse,
        Self::Sed,
        Self::Comment,
        Self::Uncomment,
        Self::Append,
        Self::Touch,
        Self::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symlink => "symlink",
            Self::Absent => "absent",
            Self::Managed => "managed",
            Self::Directory => "directory",
            Self::Recurse => "recurse",
            Self::Sed => "sed",
            Self::Comment => "comment",
            Self::Uncomment => "uncomment",
            Self::Append => "append",
            Self::Touch => "touch",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateKind {
    type Err = Error;

    /// Accepts `append` as well as `file.append`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("file.").unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| Error::invalid(s, format!("unknown state kind '{s}'")))
    }
}

impl TryFrom<String> for StateKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateKind> for String {
    fn from(kind: StateKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Raw, untyped state parameters
pub type Parameters = serde_json::Map<String, Value>;

/// One declaration to reconcile.
///
/// Built once and consumed by [`Engine::reconcile`](crate::Engine::reconcile).
#[derive(Debug, Clone, PartialEq)]
pub struct StateRequest {
    kind: StateKind,
    target: PathBuf,
    parameters: Parameters,
    dry_run: bool,
}

impl StateRequest {
    pub fn new(kind: StateKind, target: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            target: target.into(),
            parameters: Parameters::new(),
            dry_run: false,
        }
    }

    /// Set one parameter, replacing any previous value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, parameters: Parameters) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Evaluate without mutating anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

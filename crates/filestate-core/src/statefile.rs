//! Batches of declarations loaded from a file
//!
//! ```toml
//! [[state]]
//! id = "motd"
//! kind = "append"
//! name = "/etc/motd"
//! text = ["Authorized use only"]
//! ```
//!
//! Every key other than `id`, `kind` and `name` is a parameter of the state.

use std::path::{Path, PathBuf};

use filestate_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::outcome::StateResult;
use crate::request::{Parameters, StateKind, StateRequest};
use crate::Result;

/// An ordered list of declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default, rename = "state")]
    pub states: Vec<StateEntry>,
}

/// One declaration in a state file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    /// Defaults to `<kind>:<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: StateKind,
    /// Target path
    pub name: PathBuf,
    #[serde(flatten)]
    pub parameters: Parameters,
}

impl StateEntry {
    pub fn id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}:{}", self.kind, self.name.display()))
    }

    pub fn to_request(&self, dry_run: bool) -> StateRequest {
        StateRequest::new(self.kind, &self.name)
            .with_params(self.parameters.clone())
            .dry_run(dry_run)
    }
}

impl StateFile {
    /// Load from a TOML, JSON or YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let file: Self = ConfigStore::new().load(path)?;
        tracing::debug!(path = %path.display(), states = file.states.len(), "loaded state file");
        Ok(file)
    }

    /// Reconcile every declaration in order.
    ///
    /// A failed declaration does not stop the ones after it.
    pub async fn run(&self, engine: &Engine, dry_run: bool) -> Vec<(String, StateResult)> {
        let mut results = Vec::with_capacity(self.states.len());
        for entry in &self.states {
            let result = engine.reconcile(entry.to_request(dry_run)).await;
            results.push((entry.id(), result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::outcome::Outcome;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_toml_with_flattened_parameters() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("states.toml");
        fs::write(
            &path,
            r#"
[[state]]
kind = "file.append"
name = "/tmp/motd"
text = ["hello"]
makedirs = true

[[state]]
id = "gone"
kind = "absent"
name = "/tmp/old"
"#,
        )
        .unwrap();

        let file = StateFile::load(&path).unwrap();
        assert_eq!(file.states.len(), 2);
        assert_eq!(file.states[0].kind, StateKind::Append);
        assert_eq!(file.states[0].id(), "append:/tmp/motd");
        assert_eq!(file.states[0].parameters["makedirs"], serde_json::json!(true));
        assert_eq!(file.states[1].id(), "gone");
        assert!(file.states[1].parameters.is_empty());
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_states() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing/file");
        let made = temp.path().join("made");

        let file = StateFile {
            states: vec![
                StateEntry {
                    id: None,
                    kind: StateKind::Append,
                    name: missing.clone(),
                    parameters: serde_json::json!({"text": "x"})
                        .as_object()
                        .cloned()
                        .unwrap(),
                },
                StateEntry {
                    id: Some("dir".to_string()),
                    kind: StateKind::Directory,
                    name: made.clone(),
                    parameters: Parameters::new(),
                },
            ],
        };

        let engine = Engine::new(EngineConfig::default());
        let results = file.run(&engine, false).await;

        assert_eq!(results[0].1.outcome, Outcome::Failed);
        assert_eq!(results[1].0, "dir");
        assert_eq!(results[1].1.outcome, Outcome::Succeeded);
        assert!(made.is_dir());
    }
}

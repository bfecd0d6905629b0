//! Rendering of reconciliation results

use colored::Colorize;
use filestate_core::{Outcome, StateResult};
use serde::Serialize;

use crate::error::Result;

/// Results of one CLI invocation, in execution order
#[derive(Debug)]
pub struct Report {
    results: Vec<(String, StateResult)>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    id: &'a str,
    #[serde(flatten)]
    result: &'a StateResult,
}

impl Report {
    pub fn new(results: Vec<(String, StateResult)>) -> Self {
        Self { results }
    }

    pub fn single(id: String, result: StateResult) -> Self {
        Self::new(vec![(id, result)])
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|(_, result)| result.is_failure())
    }

    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            println!("{}", self.to_json()?);
        } else {
            print!("{}", self.to_text());
        }
        Ok(())
    }

    fn to_json(&self) -> Result<String> {
        let entries: Vec<JsonEntry<'_>> = self
            .results
            .iter()
            .map(|(id, result)| JsonEntry { id, result })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        for (id, result) in &self.results {
            out.push_str(&format!(
                "{} {}: {}\n",
                outcome_label(result.outcome),
                id.bold(),
                result.comment
            ));
            for (key, value) in &result.changes {
                let mut lines = value.lines();
                out.push_str(&format!("    {}: {}\n", key.cyan(), lines.next().unwrap_or("")));
                for line in lines {
                    out.push_str(&format!("        {line}\n"));
                }
            }
        }

        let count = |outcome: Outcome| {
            self.results
                .iter()
                .filter(|(_, result)| result.outcome == outcome)
                .count()
        };
        out.push_str(&format!(
            "\n{} succeeded, {} failed, {} would change\n",
            count(Outcome::Succeeded),
            count(Outcome::Failed),
            count(Outcome::WouldChange)
        ));
        out
    }
}

fn outcome_label(outcome: Outcome) -> colored::ColoredString {
    let label = format!("[{outcome}]");
    match outcome {
        Outcome::Succeeded => label.green(),
        Outcome::Failed => label.red().bold(),
        Outcome::WouldChange => label.yellow(),
    }
}

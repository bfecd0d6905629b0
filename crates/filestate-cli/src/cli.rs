//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use filestate_core::StateKind;

/// filestate - Declare how files should look, and make them look that way
#[derive(Parser, Debug)]
#[command(name = "filestate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "FILESTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile a single declaration
    ///
    /// Examples:
    ///   filestate apply directory /srv/www
    ///   filestate apply append /etc/motd -p text="Authorized use only"
    ///   filestate apply sed /etc/app.conf -p before=debug -p after=info --test
    Apply {
        /// State kind (symlink, absent, managed, directory, recurse, sed,
        /// comment, uncomment, append, touch, patch)
        kind: StateKind,

        /// Absolute path of the target
        path: PathBuf,

        /// State parameter; the value is read as JSON when it parses,
        /// otherwise as a string
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, serde_json::Value)>,

        /// Report what would change without changing anything
        #[arg(long)]
        test: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Reconcile every declaration in a state file, in order
    Run {
        /// State file (TOML, JSON or YAML)
        file: PathBuf,

        /// Report what would change without changing anything
        #[arg(long)]
        test: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_apply_with_params() {
        let cli = Cli::parse_from([
            "filestate",
            "apply",
            "file.append",
            "/tmp/motd",
            "-p",
            "text=hello world",
            "-p",
            "makedirs=true",
            "--param",
            r#"text=["a","b"]"#,
            "--test",
        ]);

        match cli.command {
            Commands::Apply {
                kind,
                path,
                params,
                test,
                json,
            } => {
                assert_eq!(kind, StateKind::Append);
                assert_eq!(path, PathBuf::from("/tmp/motd"));
                assert_eq!(
                    params,
                    vec![
                        ("text".to_string(), json!("hello world")),
                        ("makedirs".to_string(), json!(true)),
                        ("text".to_string(), json!(["a", "b"])),
                    ]
                );
                assert!(test);
                assert!(!json);
            }
            other => panic!("expected apply, got {other:?}"),
        }
    }

    #[test]
    fn numeric_looking_values_stay_json() {
        assert_eq!(parse_param("limit=3").unwrap().1, json!(3));
        assert_eq!(parse_param("empty=").unwrap().1, json!(""));
        assert_eq!(parse_param("eq=a=b").unwrap().1, json!("a=b"));
    }

    #[test]
    fn malformed_params_are_rejected() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let result = Cli::try_parse_from(["filestate", "apply", "file.bogus", "/tmp/x"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_run_with_global_flags() {
        let cli = Cli::parse_from([
            "filestate", "run", "states.toml", "--json", "-v", "-c", "engine.toml",
        ]);

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("engine.toml")));
        assert_eq!(
            cli.command,
            Commands::Run {
                file: PathBuf::from("states.toml"),
                test: false,
                json: true,
            }
        );
    }
}

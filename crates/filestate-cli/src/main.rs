//! filestate CLI
//!
//! Reconciles file declarations from the command line or from a state file.

mod cli;
mod error;
mod logging;
mod report;

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use filestate_core::{Engine, EngineConfig, StateFile, StateKind, StateRequest};

use cli::{Cli, Commands};
use error::Result;
use report::Report;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(report) if report.has_failures() => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<Report> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config);
    tracing::debug!(?engine, "engine ready");

    match cli.command {
        Commands::Apply {
            kind,
            path,
            params,
            test,
            json,
        } => cmd_apply(&engine, kind, path, params, test, json).await,
        Commands::Run { file, test, json } => cmd_run(&engine, &file, test, json).await,
    }
}

async fn cmd_apply(
    engine: &Engine,
    kind: StateKind,
    path: PathBuf,
    params: Vec<(String, serde_json::Value)>,
    test: bool,
    json: bool,
) -> Result<Report> {
    let id = format!("{kind}:{}", path.display());
    let request = StateRequest::new(kind, path)
        .with_params(params.into_iter().collect())
        .dry_run(test);

    let result = engine.reconcile(request).await;
    let report = Report::single(id, result);
    report.print(json)?;
    Ok(report)
}

async fn cmd_run(engine: &Engine, file: &Path, test: bool, json: bool) -> Result<Report> {
    let states = StateFile::load(file)?;
    tracing::info!(file = %file.display(), states = states.states.len(), dry_run = test, "running state file");

    let report = Report::new(states.run(engine, test).await);
    report.print(json)?;
    Ok(report)
}

//! `pcfg`: batch tool over a product configuration project
//!
//! ```text
//! pcfg [--config FILE] [-v] validate [NAME]
//! pcfg delta [NAME]
//! pcfg fix [NAME] [--dry-run]
//! pcfg generation NAME --on DATE
//! pcfg resolve NAME PROPERTY [--on DATE]
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use commands::Project;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut project = Project::open(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    project.execute(&cli.command, &mut out)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

//! Command-line interface for layered-config
//!
//! Provides `show` and `check` subcommands over the built-in modules.

use anyhow::Result;
use clap::{Parser, Subcommand};
use layered_config::config::names::{JSON_LOGS, LOG_LEVEL};
use layered_config::{ConfigManager, LogRegistry};
use tracing::level_filters::LevelFilter;

mod show;
mod utils;

/// Inspect layered configuration resolution
#[derive(Parser)]
#[command(name = "layered-config")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration and print it
    Show(show::ShowArgs),

    /// Resolve the configuration and report whether it succeeded
    Check(show::InstanceArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show(args) => show::run(args, cli.verbose),
        Commands::Check(args) => show::check(args, cli.verbose),
    }
}

/// Resolve under a WARN (or DEBUG with --verbose) subscriber, then install the
/// subscriber described by the resolved `LOG_LEVEL` and `JSON_LOGS`. Without a
/// loaded log module the bootstrap subscriber is installed instead.
///
/// RUST_LOG in the environment always takes precedence.
pub(crate) fn resolve_logged<F>(verbose: bool, resolve: F) -> Result<ConfigManager>
where
    F: FnOnce() -> Result<ConfigManager>,
{
    let bootstrap = LogRegistry::new(if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN });
    let manager = bootstrap.scoped(resolve)?;

    let registry = if !manager.namespace().contains(LOG_LEVEL) {
        bootstrap
    } else if verbose {
        bootstrap.json(manager.get_bool(JSON_LOGS)?)
    } else {
        LogRegistry::from_manager(&manager)?
    };
    registry.install();
    Ok(manager)
}

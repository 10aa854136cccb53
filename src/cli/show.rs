//! Show and check command implementations

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use layered_config::{ConfigManager, Settings};
use std::path::PathBuf;

use super::resolve_logged;
use super::utils::parse_csv;

#[derive(Args)]
pub struct InstanceArgs {
    /// Settings file (TOML or YAML)
    #[arg(short = 's', long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Instance name (also the environment override prefix)
    #[arg(short = 'i', long, value_name = "NAME")]
    pub instance: Option<String>,

    /// Instance root directory (defaults to ~/.<instance>)
    #[arg(short = 'r', long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Module namespace to load
    #[arg(short = 'n', long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Modules to skip (comma-separated)
    #[arg(short = 'e', long, value_name = "MODULES")]
    pub exclude: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub instance: InstanceArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Docs)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Sections with doc, default, value and source per option
    Docs,
    /// Sections with value and source per option
    Json,
    /// One line per option
    Log,
}

fn resolve(args: InstanceArgs) -> Result<ConfigManager> {
    let mut settings = Settings::load(args.settings.as_deref()).context("Failed loading settings")?;
    if let Some(instance) = args.instance {
        settings.instance_name = instance;
    }
    if let Some(root) = args.root {
        settings.instance_root = Some(root);
    }
    if let Some(namespace) = args.namespace {
        settings.namespace = namespace;
    }
    if let Some(excluded) = parse_csv(&args.exclude) {
        settings.excluded.extend(excluded);
    }

    let registry = settings.builtin_registry();
    settings
        .bootstrap(&registry)
        .with_context(|| format!("Failed resolving configuration for instance '{}'", settings.instance_name))
}

pub fn run(args: ShowArgs, verbose: bool) -> Result<()> {
    let manager = resolve_logged(verbose, || resolve(args.instance))?;
    match args.format {
        OutputFormat::Docs => println!("{}", serde_json::to_string_pretty(&manager.render_introspection())?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&manager.render_json())?),
        OutputFormat::Log => {
            for line in manager.render_log_lines() {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub fn check(args: InstanceArgs, verbose: bool) -> Result<()> {
    let manager = resolve_logged(verbose, || resolve(args))?;
    manager.log_config();
    println!(
        "OK: {} values from {} modules ({})",
        manager.namespace().len(),
        manager.modules_loaded().len(),
        manager.modules_loaded().join(", ")
    );
    Ok(())
}

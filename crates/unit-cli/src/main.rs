//! Unit registry CLI
//!
//! Composes the units listed in an application manifest, renders schema
//! changelogs and synchronizes reference data.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::AppContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if unit_core::logging::init(level).is_ok() {
        tracing::debug!(level, "Logging initialized");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd, &cli.manifest),
        None => {
            println!("{} Unit registry CLI", "unit".green().bold());
            println!();
            println!("Run {} for available commands.", "unit --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, manifest: &std::path::Path) -> Result<()> {
    match cmd {
        Commands::Units => commands::run_units(&context::catalog()?),
        Commands::Compose { sequential, json } => {
            commands::run_compose(&AppContext::load(manifest)?, sequential, json)
        }
        Commands::Render {
            template,
            params,
            disabled,
            out,
            check,
        } => commands::run_render(&template, &params, &disabled, out.as_deref(), check),
        Commands::Changelog {
            namespace,
            changeset,
            out,
            check,
        } => commands::run_changelog(
            &AppContext::load(manifest)?,
            namespace.as_deref(),
            &changeset,
            out.as_deref(),
            check,
        ),
        Commands::Sync {
            table,
            data,
            store,
            dry_run,
            json,
        } => commands::run_sync(&AppContext::load(manifest)?, &table, &data, &store, dry_run, json),
        Commands::Seed {
            store,
            dry_run,
            json,
        } => commands::run_seed(&AppContext::load(manifest)?, &store, dry_run, json),
    }
}

//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Unit registry - compose units, render schema changelogs and sync reference data
#[derive(Parser, Debug)]
#[command(name = "unit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Application manifest
    #[arg(short, long, global = true, env = "UNIT_MANIFEST", default_value = "units.toml")]
    pub manifest: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the units this application can deploy
    Units,

    /// Compose every manifest unit and list the resulting artifacts
    Compose {
        /// Invoke producers one at a time
        #[arg(long)]
        sequential: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Render a schema template
    ///
    /// Examples:
    ///   unit render schema.xml -p table_prefix=shipping_
    ///   unit render schema.xml -d city -o out/schema.xml
    ///   unit render schema.xml -o out/schema.xml --check
    Render {
        /// Template file
        template: PathBuf,

        /// Parameter binding, NAME=VALUE
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Section to leave out
        #[arg(short, long = "disable")]
        disabled: Vec<String>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Compare against --out without writing; fail on any difference
        #[arg(long, requires = "out")]
        check: bool,
    },

    /// Render the geo changelog of one manifest unit
    Changelog {
        /// Namespace of the geo unit in the manifest
        #[arg(short, long)]
        namespace: Option<String>,

        /// Changeset id prefix
        #[arg(long, default_value = "geo")]
        changeset: String,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Compare against --out without writing; fail on any difference
        #[arg(long, requires = "out")]
        check: bool,
    },

    /// Reconcile a dataset file into a composed table
    Sync {
        /// Table name as composed (with prefix)
        table: String,

        /// JSON, YAML or TOML dataset
        data: PathBuf,

        /// Directory of the file-backed stores
        #[arg(long, env = "UNIT_STORE", default_value = ".units/store")]
        store: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },

    /// Sync the bundled reference data of every geo unit
    Seed {
        /// Directory of the file-backed stores
        #[arg(long, env = "UNIT_STORE", default_value = ".units/store")]
        store: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for CI/CD integration
        #[arg(long)]
        json: bool,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

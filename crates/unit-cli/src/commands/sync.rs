//! Sync and seed command implementations
//!
//! Both compose the manifest first: table definitions, natural keys and
//! backends come from the composed registry, never from the dataset.

use std::path::Path;

use colored::Colorize;
use unit_core::{ComposeOptions, SyncEngine, SyncOptions, SyncReport, load_records};
use unit_fs::NormalizedPath;
use unit_meta::Registry;
use unit_reference::{GeoConfig, sync_bundled};

use crate::context::AppContext;
use crate::error::Result;

fn engine<'r>(
    context: &AppContext,
    registry: &'r Registry,
    store: &Path,
    dry_run: bool,
) -> SyncEngine<'r> {
    let mut engine = SyncEngine::new(registry).with_options(SyncOptions {
        dry_run,
        ..SyncOptions::default()
    });
    for store in context.stores(store) {
        engine = engine.with_store(store);
    }
    engine
}

/// Run the sync command
///
/// Reconciles one dataset file into one composed table.
pub fn run_sync(
    context: &AppContext,
    table: &str,
    data: &Path,
    store: &Path,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let (registry, _) = context.compose(&ComposeOptions::default())?;
    let records = load_records(&NormalizedPath::new(data))?;
    let report = engine(context, &registry, store, dry_run).sync(table, records)?;
    print_reports(&[report], json)
}

/// Run the seed command
///
/// Syncs the bundled datasets of every geo unit in the manifest.
pub fn run_seed(context: &AppContext, store: &Path, dry_run: bool, json: bool) -> Result<()> {
    let (registry, _) = context.compose(&ComposeOptions::default())?;
    let engine = engine(context, &registry, store, dry_run);

    let mut reports = Vec::new();
    for entry in context.geo_entries() {
        let config = GeoConfig::new(entry.settings.clone());
        reports.extend(sync_bundled(&engine, &config)?);
    }
    print_reports(&reports, json)
}

fn print_reports(reports: &[SyncReport], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!("{} Nothing to synchronize.", "OK".green().bold());
        return Ok(());
    }

    for report in reports {
        let status = if report.dry_run {
            "DRY-RUN".yellow().bold()
        } else if report.changes() == 0 {
            "OK".green().bold()
        } else {
            "SYNCED".green().bold()
        };
        println!(
            "{} {} ({})",
            status,
            report.table.cyan(),
            report.backend.dimmed()
        );
        if report.changes() == 0 {
            println!("   {} unchanged", report.unchanged);
            continue;
        }
        println!(
            "   {} {} inserted  {} {} updated ({} reactivated)  {} {} deactivated  {} unchanged",
            "+".green(),
            report.inserted,
            "~".yellow(),
            report.updated,
            report.reactivated,
            "-".red(),
            report.deactivated,
            report.unchanged
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use unit_core::{JsonFileStore, RecordStore};

    const MANIFEST: &str = r#"
[app]
name = "logistics"

[[units]]
group = "io.units"
artifact = "geo"
version = "*"

[units.settings]
table_prefix = "geo"

[units.settings.features]
states = false
"#;

    fn setup() -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("units.toml");
        fs::write(&path, MANIFEST).unwrap();
        let context = AppContext::load(&path).unwrap();
        (dir, context)
    }

    #[test]
    fn seed_fills_only_enabled_tables() {
        let (dir, context) = setup();
        let store_dir = dir.path().join("store");
        run_seed(&context, &store_dir, false, false).unwrap();

        let store = JsonFileStore::new(crate::context::DEFAULT_STORE, store_dir.join("files"));
        assert!(!store.fetch("geo_country").unwrap().is_empty());
        assert!(store.fetch("geo_state").unwrap().is_empty());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (dir, context) = setup();
        let data = dir.path().join("countries.yaml");
        fs::write(&data, "- code: US\n  name: United States\n").unwrap();
        let store_dir = dir.path().join("store");

        run_sync(&context, "geo_country", &data, &store_dir, true, true).unwrap();
        let store = JsonFileStore::new("files", store_dir.join("files"));
        assert!(store.fetch("geo_country").unwrap().is_empty());
    }

    #[test]
    fn unknown_table_is_an_error() {
        let (dir, context) = setup();
        let data = dir.path().join("countries.yaml");
        fs::write(&data, "- code: US\n").unwrap();
        assert!(run_sync(&context, "country", &data, &dir.path().join("store"), false, false).is_err());
    }
}

//! Application context: manifest, unit catalog and stores
//!
//! Every command that touches units starts from the manifest. The catalog
//! is fixed at build time; units are never discovered at runtime.

use std::path::Path;
use std::sync::Arc;

use unit_core::{
    AppManifest, ComposeOptions, CompositionReport, JsonFileStore, RecordStore, UnitCatalog,
    UnitEntry, compose_manifest,
};
use unit_fs::NormalizedPath;
use unit_meta::Registry;
use unit_reference::GeoUnit;

use crate::error::{CliError, Result};

/// Store name used when the manifest declares no backends.
pub const DEFAULT_STORE: &str = "files";

/// Units shipped with this binary.
pub fn catalog() -> Result<UnitCatalog> {
    Ok(UnitCatalog::new().with(GeoUnit::new()?))
}

/// A loaded application manifest with its catalog.
pub struct AppContext {
    manifest: AppManifest,
    catalog: UnitCatalog,
}

impl AppContext {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::user(format!(
                "No manifest at {}. Pass --manifest or set UNIT_MANIFEST.",
                path.display()
            )));
        }
        let manifest = AppManifest::load(&NormalizedPath::new(path))?;
        tracing::debug!(app = %manifest.app.name, units = manifest.units.len(), "Loaded manifest");
        Ok(Self {
            manifest,
            catalog: catalog()?,
        })
    }

    pub fn manifest(&self) -> &AppManifest {
        &self.manifest
    }

    /// Compose every manifest unit into a fresh registry.
    pub fn compose(&self, options: &ComposeOptions) -> Result<(Registry, Vec<CompositionReport>)> {
        let mut registry = self.manifest.registry();
        let reports = compose_manifest(&mut registry, &self.manifest, &self.catalog, options)?;
        Ok((registry, reports))
    }

    /// One file-backed store per declared backend, under `dir/<backend>`.
    pub fn stores(&self, dir: &Path) -> Vec<Arc<dyn RecordStore>> {
        let names: Vec<&str> = if self.manifest.app.backends.is_empty() {
            vec![DEFAULT_STORE]
        } else {
            self.manifest.app.backends.iter().map(String::as_str).collect()
        };
        names
            .into_iter()
            .map(|name| Arc::new(JsonFileStore::new(name, dir.join(name))) as Arc<dyn RecordStore>)
            .collect()
    }

    /// Manifest entries deploying the geo unit.
    pub fn geo_entries(&self) -> impl Iterator<Item = &UnitEntry> {
        self.manifest
            .units
            .iter()
            .filter(|e| e.group == unit_reference::unit::GROUP && e.artifact == unit_reference::unit::ARTIFACT)
    }

    /// The geo entry deployed under `namespace`.
    pub fn geo_entry(&self, namespace: Option<&str>) -> Result<&UnitEntry> {
        self.geo_entries()
            .find(|e| e.namespace.as_deref() == namespace)
            .ok_or_else(|| {
                CliError::user(match namespace {
                    Some(ns) => format!("No geo unit in namespace '{}'", ns),
                    None => "No geo unit without a namespace; pass --namespace".to_string(),
                })
            })
    }

    /// Changelog author from the manifest.
    pub fn author(&self) -> &str {
        self.manifest.app.author.as_deref().unwrap_or(&self.manifest.app.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[app]
name = "logistics"
backends = ["rdbms", "archive"]

[[units]]
group = "io.units"
artifact = "geo"
version = "*"
namespace = "shipping"

[units.settings]
table_prefix = "shipping"
backend_name = "rdbms"
"#;

    fn context(content: &str) -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("units.toml");
        fs::write(&path, content).unwrap();
        let context = AppContext::load(&path).unwrap();
        (dir, context)
    }

    #[test]
    fn missing_manifest_is_a_user_error() {
        let dir = TempDir::new().unwrap();
        let err = AppContext::load(&dir.path().join("units.toml")).err().unwrap();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn one_store_per_backend() {
        let (dir, context) = context(MANIFEST);
        let stores = context.stores(dir.path());
        let names: Vec<&str> = stores.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["rdbms", "archive"]);
    }

    #[test]
    fn geo_entry_is_found_by_namespace() {
        let (_dir, context) = context(MANIFEST);
        assert!(context.geo_entry(Some("shipping")).is_ok());
        assert!(context.geo_entry(None).is_err());
        assert_eq!(context.author(), "logistics");
    }

    #[test]
    fn compose_builds_the_registry() {
        let (_dir, context) = context(MANIFEST);
        let (registry, reports) = context.compose(&ComposeOptions::sequential()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(registry.table("shipping_country").is_some());
    }
}

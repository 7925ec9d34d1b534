//! Deployment tests
//!
//! Manifests with several geo instances: composed tables, rendered
//! changelogs and backend routing must all agree with each other.

use std::collections::BTreeSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use regex::Regex;
use rstest::rstest;
use unit_core::{
    AppManifest, ComposeOptions, MemoryStore, RecordStore, SyncEngine, UnitCatalog,
    compose_manifest,
};
use unit_meta::{ArtifactKind, Registry, UnitSettings};
use unit_reference::{GeoConfig, GeoUnit, render_changelog, sync_bundled};

fn catalog() -> UnitCatalog {
    UnitCatalog::new().with(GeoUnit::new().unwrap())
}

fn composed_tables(registry: &Registry) -> BTreeSet<String> {
    registry
        .by_kind(ArtifactKind::Table)
        .map(|p| p.name().to_string())
        .collect()
}

fn changelog_tables(xml: &str) -> BTreeSet<String> {
    let re = Regex::new(r#"<createTable tableName="([^"]+)">"#).unwrap();
    re.captures_iter(xml).map(|c| c[1].to_string()).collect()
}

#[rstest]
#[case::everything(UnitSettings::new(), &["country", "state", "city"])]
#[case::no_states(UnitSettings::new().with_feature("states", false), &["country"])]
#[case::no_cities(UnitSettings::new().with_feature("cities", false), &["country", "state"])]
#[case::city_table_off(UnitSettings::new().with_disabled("table:city"), &["country", "state"])]
fn changelog_matches_the_composed_tables(#[case] settings: UnitSettings, #[case] expected: &[&str]) {
    let settings = settings.with_prefix("geo");
    let config = GeoConfig::new(settings.clone());
    let (descriptor, producers) = GeoUnit::new().unwrap().deploy(None, config.clone());

    let mut registry = Registry::new();
    unit_core::compose(&mut registry, &descriptor, &producers).unwrap();

    let expected: BTreeSet<String> = expected.iter().map(|t| format!("geo_{}", t)).collect();
    assert_eq!(composed_tables(&registry), expected);

    let xml = render_changelog(&config, "ops", "geo").unwrap();
    assert_eq!(changelog_tables(&xml), expected);
}

#[test]
fn explicitly_disabled_section_only_affects_the_changelog() {
    let config = GeoConfig::new(UnitSettings::new().with_disabled_section("city"));
    let (descriptor, producers) = GeoUnit::new().unwrap().deploy(None, config.clone());

    let mut registry = Registry::new();
    unit_core::compose(&mut registry, &descriptor, &producers).unwrap();
    assert!(registry.table("city").is_some());

    let xml = render_changelog(&config, "ops", "geo").unwrap();
    assert!(!changelog_tables(&xml).contains("city"));
}

#[test]
fn instances_route_to_their_own_backends() {
    let manifest = AppManifest::parse(
        r#"
[app]
name = "logistics"
backends = ["rdbms", "archive"]

[[units]]
group = "io.units"
artifact = "geo"
version = "^0.1"
namespace = "shipping"

[units.settings]
backend_name = "rdbms"
table_prefix = "shipping"

[[units]]
group = "io.units"
artifact = "geo"
version = "^0.1"
namespace = "billing"

[units.settings]
backend_name = "archive"
table_prefix = "billing"

[units.settings.features]
states = false
"#,
    )
    .unwrap();
    assert!(manifest.validate().is_empty());

    let mut registry = manifest.registry();
    compose_manifest(&mut registry, &manifest, &catalog(), &ComposeOptions::default()).unwrap();

    let rdbms = Arc::new(MemoryStore::new("rdbms"));
    let archive = Arc::new(MemoryStore::new("archive"));
    let engine = SyncEngine::new(&registry)
        .with_store(rdbms.clone())
        .with_store(archive.clone());

    for entry in &manifest.units {
        sync_bundled(&engine, &GeoConfig::new(entry.settings.clone())).unwrap();
    }

    assert!(!rdbms.fetch("shipping_city").unwrap().is_empty());
    assert!(rdbms.fetch("billing_country").unwrap().is_empty());
    assert!(!archive.fetch("billing_country").unwrap().is_empty());
    assert!(archive.fetch("shipping_country").unwrap().is_empty());
}

#[test]
fn unknown_backend_fails_before_anything_is_composed() {
    let manifest = AppManifest::parse(
        r#"
[app]
name = "logistics"
backends = ["rdbms"]

[[units]]
group = "io.units"
artifact = "geo"
version = "*"

[units.settings]
backend_name = "nosql"
"#,
    )
    .unwrap();

    let mut registry = manifest.registry();
    let err = compose_manifest(&mut registry, &manifest, &catalog(), &ComposeOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("nosql"), "{err}");
    assert!(registry.is_empty());
    assert_eq!(registry.units().count(), 0);
}

#[test]
fn unsatisfiable_version_is_reported() {
    let manifest = AppManifest::parse(
        r#"
[app]
name = "logistics"

[[units]]
group = "io.units"
artifact = "geo"
version = ">=9"
"#,
    )
    .unwrap();

    let mut registry = manifest.registry();
    let err = compose_manifest(&mut registry, &manifest, &catalog(), &ComposeOptions::default())
        .unwrap_err();
    assert!(matches!(err, unit_core::Error::UnresolvedUnit { .. }), "{err}");
}

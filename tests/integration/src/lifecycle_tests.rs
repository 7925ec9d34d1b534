//! Reference-data lifecycle tests
//!
//! A geo deployment is composed, then a country dataset is synchronized
//! through several revisions against a file-backed store. Rows are never
//! deleted: removed keys are deactivated and come back as the same row.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use unit_core::{
    Error, JsonFileStore, MemoryStore, Record, RecordStore, StoredRecord, SyncEngine, SyncOptions,
    compose,
};
use unit_meta::{Registry, UnitSettings};
use unit_reference::{GeoConfig, GeoUnit};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// One composed geo deployment with a file-backed store.
struct TestApp {
    _dir: TempDir,
    registry: Registry,
    store: Arc<JsonFileStore>,
}

impl TestApp {
    fn new(settings: UnitSettings) -> Self {
        let dir = TempDir::new().unwrap();
        let unit = GeoUnit::new().unwrap();
        let (descriptor, producers) = unit.deploy(Some("geo"), GeoConfig::new(settings));

        let mut registry = Registry::new();
        compose(&mut registry, &descriptor, &producers).unwrap();

        let store = Arc::new(JsonFileStore::new("files", dir.path().join("store")));
        Self {
            _dir: dir,
            registry,
            store,
        }
    }

    fn engine(&self) -> SyncEngine<'_> {
        SyncEngine::new(&self.registry).with_store(self.store.clone())
    }

    fn rows(&self, table: &str) -> Vec<StoredRecord> {
        self.store.fetch(table).unwrap()
    }

    fn row<'a>(rows: &'a [StoredRecord], code: &str) -> &'a StoredRecord {
        rows.iter()
            .find(|r| r.fields["code"] == code)
            .unwrap_or_else(|| panic!("no row for {}", code))
    }
}

fn countries(entries: &[(&str, &str)]) -> Vec<Record> {
    entries
        .iter()
        .map(|(code, name)| json!({ "code": code, "name": name }).as_object().cloned().unwrap())
        .collect()
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn revisions_insert_update_deactivate_and_reactivate() {
    let app = TestApp::new(UnitSettings::new().with_prefix("geo"));
    let engine = app.engine();

    let first = engine
        .sync(
            "geo_country",
            countries(&[("US", "United States"), ("CA", "Canada"), ("MM", "Burma")]),
        )
        .unwrap();
    assert_eq!((first.inserted, first.updated, first.deactivated), (3, 0, 0));
    let ids: Vec<_> = app.rows("geo_country").iter().map(|r| r.id).collect();

    // Rename, drop and add in one revision.
    let second = engine
        .sync(
            "geo_country",
            countries(&[("US", "United States"), ("MM", "Myanmar"), ("MX", "Mexico")]),
        )
        .unwrap();
    assert_eq!(
        (second.inserted, second.updated, second.deactivated, second.unchanged),
        (1, 1, 1, 1)
    );

    let rows = app.rows("geo_country");
    assert_eq!(rows.len(), 4);
    assert!(!TestApp::row(&rows, "CA").is_active);
    assert_eq!(TestApp::row(&rows, "MM").fields["name"], "Myanmar");
    assert!(TestApp::row(&rows, "MM").modified_at.is_some());

    // Canada returns as the same row.
    let third = engine
        .sync(
            "geo_country",
            countries(&[
                ("US", "United States"),
                ("MM", "Myanmar"),
                ("MX", "Mexico"),
                ("CA", "Canada"),
            ]),
        )
        .unwrap();
    assert_eq!((third.inserted, third.updated, third.reactivated), (0, 1, 1));

    let rows = app.rows("geo_country");
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.is_active));
    let canada = TestApp::row(&rows, "CA");
    assert!(ids.contains(&canada.id));

    let fourth = engine
        .sync(
            "geo_country",
            countries(&[
                ("US", "United States"),
                ("MM", "Myanmar"),
                ("MX", "Mexico"),
                ("CA", "Canada"),
            ]),
        )
        .unwrap();
    assert_eq!(fourth.changes(), 0);
}

#[test]
fn inactive_rows_missing_from_the_source_stay_untouched() {
    let app = TestApp::new(UnitSettings::new().with_prefix("geo"));
    let engine = app.engine();

    engine
        .sync("geo_country", countries(&[("US", "United States"), ("CA", "Canada")]))
        .unwrap();
    engine.sync("geo_country", countries(&[("US", "United States")])).unwrap();
    let before = TestApp::row(&app.rows("geo_country"), "CA").clone();

    let report = engine.sync("geo_country", countries(&[("US", "United States")])).unwrap();
    assert_eq!(report.changes(), 0);
    assert_eq!(TestApp::row(&app.rows("geo_country"), "CA"), &before);
}

#[test]
fn composite_natural_keys_tell_same_named_states_apart() {
    let app = TestApp::new(UnitSettings::new().with_prefix("geo"));
    let states: Vec<Record> = [("US", "WA", "Washington"), ("AU", "WA", "Western Australia")]
        .into_iter()
        .map(|(country, code, name)| {
            json!({ "country_code": country, "code": code, "name": name })
                .as_object()
                .cloned()
                .unwrap()
        })
        .collect();

    let report = app.engine().sync("geo_state", states).unwrap();
    assert_eq!(report.inserted, 2);
}

#[test]
fn source_rows_carrying_store_fields_leave_the_table_readable() {
    let app = TestApp::new(UnitSettings::new().with_prefix("geo"));
    let engine = app.engine();
    let mut tagged = countries(&[("US", "United States")]);
    tagged[0].insert("id".to_string(), json!(840));

    for _ in 0..2 {
        let err = engine.sync("geo_country", tagged.clone()).unwrap_err();
        assert!(matches!(err, Error::ReservedField { ref field, .. } if field == "id"), "{err}");
        assert!(app.rows("geo_country").is_empty());
    }

    let report = engine.sync("geo_country", countries(&[("US", "United States")])).unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(app.rows("geo_country")[0].id.0, 1);
}

#[test]
fn duplicate_keys_in_the_source_are_rejected_before_writing() {
    let app = TestApp::new(UnitSettings::new().with_prefix("geo"));
    let err = app
        .engine()
        .sync("geo_country", countries(&[("US", "United States"), ("US", "USA")]))
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateNaturalKey { .. }), "{err}");
    assert!(app.rows("geo_country").is_empty());
}

// =============================================================================
// Failure and rollback
// =============================================================================

#[test]
fn failed_write_rolls_back_and_can_be_retried() {
    let unit = GeoUnit::new().unwrap();
    let (descriptor, producers) = unit.deploy(None, GeoConfig::default());
    let mut registry = Registry::new();
    compose(&mut registry, &descriptor, &producers).unwrap();

    let source = countries(&[("US", "a"), ("CA", "b"), ("MX", "c"), ("FR", "d"), ("DE", "e")]);

    let flaky = Arc::new(MemoryStore::default().with_write_limit(3));
    let err = SyncEngine::new(&registry)
        .with_store(flaky.clone())
        .with_options(SyncOptions {
            chunk_size: 2,
            ..SyncOptions::default()
        })
        .sync("country", source.clone())
        .unwrap_err();
    match &err {
        Error::Backend { counts, .. } => {
            assert_eq!((counts.attempted, counts.succeeded, counts.failed), (4, 2, 2));
        }
        e => panic!("unexpected error: {e}"),
    }
    assert!(err.is_retryable());
    assert!(flaky.fetch("country").unwrap().is_empty());

    let healthy = Arc::new(MemoryStore::default());
    let report = SyncEngine::new(&registry)
        .with_store(healthy.clone())
        .sync("country", source)
        .unwrap();
    assert_eq!(report.inserted, 5);
    assert_eq!(healthy.fetch("country").unwrap().len(), 5);
}

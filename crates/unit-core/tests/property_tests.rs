use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use unit_core::compose::apply_prefix;
use unit_core::{MemoryStore, Record, RecordStore, SyncEngine};
use unit_meta::{Artifact, ArtifactKey, ArtifactKind, ProducedArtifact, Provenance, Registry, TableDef, UnitId};

fn registry() -> Registry {
    let mut registry = Registry::new();
    let provenance = Provenance {
        unit: UnitId::new("io.units", "geo", "1.0.0").unwrap(),
        namespace: None,
    };
    registry
        .insert(ProducedArtifact::new(
            Artifact::Table(
                TableDef::new("country")
                    .with_backend("memory")
                    .with_natural_key(["code"]),
            ),
            provenance,
        ))
        .unwrap();
    registry
}

/// Unique codes mapped to names.
fn dataset() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map("[A-Z]{2}", "[a-z]{1,6}", 0..12).prop_map(|m: BTreeMap<String, String>| {
        m.into_iter()
            .map(|(code, name)| json!({ "code": code, "name": name }).as_object().cloned().unwrap())
            .collect()
    })
}

proptest! {
    #[test]
    fn sync_is_idempotent_and_keeps_active_keys_unique(
        runs in prop::collection::vec(dataset(), 1..5),
    ) {
        let registry = registry();
        let store = Arc::new(MemoryStore::default());
        let engine = SyncEngine::new(&registry).with_store(store.clone());

        for source in runs {
            engine.sync("country", source.clone()).unwrap();

            let again = engine.sync("country", source.clone()).unwrap();
            prop_assert_eq!(again.changes(), 0);

            let rows = store.fetch("country").unwrap();
            let active: Vec<&str> = rows
                .iter()
                .filter(|r| r.is_active)
                .map(|r| r.fields["code"].as_str().unwrap())
                .collect();
            let unique: BTreeSet<&str> = active.iter().copied().collect();
            prop_assert_eq!(active.len(), unique.len());

            let expected: BTreeSet<&str> = source.iter().map(|r| r["code"].as_str().unwrap()).collect();
            prop_assert_eq!(unique, expected);

            // Rows are never deleted, so every code ever seen has exactly one row.
            let all: BTreeSet<&str> = rows.iter().map(|r| r.fields["code"].as_str().unwrap()).collect();
            prop_assert_eq!(all.len(), rows.len());
        }
    }

    #[test]
    fn prefix_is_applied_exactly_once(
        prefix in "[a-z][a-z0-9]{0,6}",
        name in "[a-z][a-z_]{0,10}",
    ) {
        prop_assume!(!name.starts_with(&format!("{}_", prefix)));
        let own: BTreeSet<ArtifactKey> = [ArtifactKey::new(ArtifactKind::Table, name.clone())]
            .into_iter()
            .collect();
        let once = apply_prefix(TableDef::new(name.clone()).into(), &prefix, &own).unwrap();
        prop_assert_eq!(once.name(), format!("{}_{}", prefix, name));
        prop_assert!(apply_prefix(once, &prefix, &own).is_err());
    }
}

//! Natural-key reconciliation
//!
//! Reference datasets are matched to stored rows by a natural key (one or
//! more field values) rather than by surrogate id. [`reconcile`] computes
//! inserts, updates and deactivations; applying them is the job of
//! [`crate::sync::SyncEngine`].

mod diff;
mod record;

pub use diff::{ReconciliationResult, Update, reconcile};
pub use record::{
    ChangeDetector, NaturalKey, RESERVED_FIELDS, Record, RecordId, StoredRecord, reserved_field,
};

use crate::Result;

/// [`reconcile`] keyed on `key_fields`, comparing with `detector`.
pub fn reconcile_by_fields(
    source: Vec<Record>,
    existing: &[StoredRecord],
    key_fields: &[String],
    detector: &ChangeDetector,
) -> Result<ReconciliationResult> {
    reconcile(
        source,
        existing,
        |record| NaturalKey::extract(record, key_fields),
        |record, stored| detector.changed(record, stored),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn country(code: &str, name: &str) -> Record {
        record(json!({"code": code, "name": name}))
    }

    fn stored(id: u64, code: &str, name: &str) -> StoredRecord {
        StoredRecord::new(RecordId(id), country(code, name))
    }

    fn by_code(source: Vec<Record>, existing: &[StoredRecord]) -> Result<ReconciliationResult> {
        reconcile_by_fields(source, existing, &["code".to_string()], &ChangeDetector::default())
    }

    #[test]
    fn empty_store_inserts_everything() {
        let result = by_code(
            vec![country("US", "United States"), country("CA", "Canada")],
            &[],
        )
        .unwrap();

        assert_eq!(
            result.inserts,
            vec![country("US", "United States"), country("CA", "Canada")]
        );
        assert!(result.updates.is_empty());
        assert!(result.deactivations.is_empty());
    }

    #[test]
    fn dropped_record_is_deactivated_and_new_one_inserted() {
        let existing = [stored(1, "US", "United States"), stored(2, "CA", "Canada")];
        let result = by_code(
            vec![country("US", "United States"), country("MM", "Myanmar")],
            &existing,
        )
        .unwrap();

        assert_eq!(result.inserts, vec![country("MM", "Myanmar")]);
        assert!(result.updates.is_empty());
        assert_eq!(result.deactivations, vec![RecordId(2)]);
        assert_eq!(result.unchanged, 1);
    }

    #[test]
    fn changed_record_is_updated_with_surrogate_id() {
        let existing = [stored(5, "US", "United States")];
        let result = by_code(vec![country("US", "United States of America")], &existing).unwrap();
        assert_eq!(
            result.updates,
            vec![Update {
                id: RecordId(5),
                record: country("US", "United States of America"),
                reactivate: false,
            }]
        );
    }

    #[test]
    fn inactive_match_is_reactivated_and_inactive_orphan_left_alone() {
        let mut gone = stored(1, "CA", "Canada");
        gone.is_active = false;
        let mut orphan = stored(2, "YU", "Yugoslavia");
        orphan.is_active = false;

        let result = by_code(vec![country("CA", "Canada")], &[gone, orphan]).unwrap();
        assert_eq!(result.updates.len(), 1);
        assert!(result.updates[0].reactivate);
        assert!(result.deactivations.is_empty());
    }

    #[test]
    fn empty_source_deactivates_every_active_row() {
        let existing = [stored(1, "US", "United States"), stored(2, "CA", "Canada")];
        let result = by_code(Vec::new(), &existing).unwrap();
        assert_eq!(result.deactivations, vec![RecordId(1), RecordId(2)]);
        assert_eq!(result.write_count(), 2);
    }

    #[test]
    fn duplicate_source_keys_are_rejected() {
        let err = by_code(vec![country("US", "A"), country("US", "B")], &[]).unwrap_err();
        assert!(matches!(err, Error::DuplicateNaturalKey { origin: "source", .. }));
    }

    #[test]
    fn duplicate_stored_keys_are_rejected() {
        let existing = [stored(1, "US", "A"), stored(2, "US", "B")];
        let err = by_code(Vec::new(), &existing).unwrap_err();
        match err {
            Error::DuplicateNaturalKey { origin, key } => {
                assert_eq!(origin, "stored");
                assert_eq!(key, "(\"US\")");
            }
            e => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn composite_keys_match_on_all_fields() {
        let fields = vec!["country".to_string(), "code".to_string()];
        let existing = [StoredRecord::new(
            RecordId(1),
            record(json!({"country": "US", "code": "WA", "name": "Washington"})),
        )];
        let source = vec![
            record(json!({"country": "US", "code": "WA", "name": "Washington"})),
            record(json!({"country": "AU", "code": "WA", "name": "Western Australia"})),
        ];
        let result =
            reconcile_by_fields(source, &existing, &fields, &ChangeDetector::default()).unwrap();
        assert_eq!(result.inserts.len(), 1);
        assert_eq!(result.unchanged, 1);
    }
}

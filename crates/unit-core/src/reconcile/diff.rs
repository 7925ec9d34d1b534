//! Natural-key diff between a source dataset and stored rows

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use serde::Serialize;

use super::record::{Record, RecordId, StoredRecord};
use crate::{Error, Result};

/// An update to a stored row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub id: RecordId,
    pub record: Record,
    /// The stored row was inactive and becomes active again.
    pub reactivate: bool,
}

/// The three disjoint write sets of one reconciliation.
///
/// `inserts` and `updates` follow source order; `deactivations` follow the
/// order of the stored rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationResult {
    pub inserts: Vec<Record>,
    pub updates: Vec<Update>,
    pub deactivations: Vec<RecordId>,
    /// Source records that matched an active, unchanged row.
    pub unchanged: usize,
}

impl ReconciliationResult {
    /// Number of writes the result requires.
    pub fn write_count(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deactivations.len()
    }

    pub fn is_noop(&self) -> bool {
        self.write_count() == 0
    }
}

/// Compute the writes that make `existing` match `source`.
///
/// - source key absent from `existing`: insert
/// - present, active and `changed`: update carrying the stored id
/// - present but inactive: update that reactivates the row
/// - present, active and unchanged: nothing
/// - active stored rows absent from `source`: deactivate
///
/// Rows are never deleted, and inactive rows absent from `source` are left
/// as they are, so running again on the result yields no writes.
///
/// # Errors
///
/// Returns [`Error::DuplicateNaturalKey`] if two source records or two
/// stored rows share a key, and propagates errors from `natural_key`.
pub fn reconcile<K, F, C>(
    source: Vec<Record>,
    existing: &[StoredRecord],
    natural_key: F,
    changed: C,
) -> Result<ReconciliationResult>
where
    K: Eq + Hash + Display,
    F: Fn(&Record) -> Result<K>,
    C: Fn(&Record, &StoredRecord) -> bool,
{
    let mut index: HashMap<K, usize> = HashMap::with_capacity(existing.len());
    for (position, stored) in existing.iter().enumerate() {
        let key = natural_key(&stored.fields)?;
        if index.contains_key(&key) {
            return Err(Error::DuplicateNaturalKey {
                origin: "stored",
                key: key.to_string(),
            });
        }
        index.insert(key, position);
    }

    let mut matched = vec![false; existing.len()];
    let mut seen: HashSet<K> = HashSet::with_capacity(source.len());
    let mut result = ReconciliationResult::default();

    for record in source {
        let key = natural_key(&record)?;
        if seen.contains(&key) {
            return Err(Error::DuplicateNaturalKey {
                origin: "source",
                key: key.to_string(),
            });
        }

        match index.get(&key) {
            Some(&position) => {
                matched[position] = true;
                let stored = &existing[position];
                if !stored.is_active {
                    result.updates.push(Update {
                        id: stored.id,
                        record,
                        reactivate: true,
                    });
                } else if changed(&record, stored) {
                    result.updates.push(Update {
                        id: stored.id,
                        record,
                        reactivate: false,
                    });
                } else {
                    result.unchanged += 1;
                }
            }
            None => result.inserts.push(record),
        }
        seen.insert(key);
    }

    result.deactivations = existing
        .iter()
        .zip(&matched)
        .filter(|(stored, matched)| stored.is_active && !**matched)
        .map(|(stored, _)| stored.id)
        .collect();

    tracing::debug!(
        inserts = result.inserts.len(),
        updates = result.updates.len(),
        deactivations = result.deactivations.len(),
        unchanged = result.unchanged,
        "Reconciled dataset"
    );
    Ok(result)
}

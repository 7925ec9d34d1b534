//! SyncEngine implementation
//!
//! The SyncEngine brings a stored reference table in line with a source
//! dataset: it resolves the table definition from the registry, reconciles
//! on the table's natural key and applies the writes in one transaction,
//! one bounded chunk at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use unit_meta::{Registry, TableDef};

use crate::error::WriteCounts;
use crate::reconcile::{
    ChangeDetector, Record, ReconciliationResult, reconcile_by_fields, reserved_field,
};
use crate::store::{RecordStore, StoreTransaction, Write};
use crate::{Error, Result};

/// Default number of writes per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Options for sync operations
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Compute and report the writes without applying them.
    pub dry_run: bool,
    /// Writes handed to the store per [`StoreTransaction::apply`] call.
    pub chunk_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Report from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub table: String,
    pub backend: String,
    pub inserted: usize,
    pub updated: usize,
    /// Updates that also reactivated a row; included in `updated`.
    pub reactivated: usize,
    pub deactivated: usize,
    pub unchanged: usize,
    /// Writes issued to the store.
    pub attempted: usize,
    pub failed: usize,
    pub committed: bool,
    pub dry_run: bool,
}

impl SyncReport {
    fn planned(table: &str, backend: &str, result: &ReconciliationResult, dry_run: bool) -> Self {
        Self {
            table: table.to_string(),
            backend: backend.to_string(),
            inserted: result.inserts.len(),
            updated: result.updates.len(),
            reactivated: result.updates.iter().filter(|u| u.reactivate).count(),
            deactivated: result.deactivations.len(),
            unchanged: result.unchanged,
            attempted: 0,
            failed: 0,
            committed: false,
            dry_run,
        }
    }

    pub fn changes(&self) -> usize {
        self.inserted + self.updated + self.deactivated
    }
}

/// Engine for synchronizing reference tables
pub struct SyncEngine<'r> {
    registry: &'r Registry,
    stores: BTreeMap<String, Arc<dyn RecordStore>>,
    options: SyncOptions,
}

impl<'r> SyncEngine<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            stores: BTreeMap::new(),
            options: SyncOptions::default(),
        }
    }

    /// Serve the backend named by `store.name()`.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.stores.insert(store.name().to_string(), store);
        self
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Resolve a table and the store serving it.
    ///
    /// Tables without a backend name use the only configured store, if
    /// there is exactly one.
    pub fn resolve(&self, table: &str) -> Result<(&'r TableDef, Arc<dyn RecordStore>)> {
        let def = self.registry.table(table).ok_or_else(|| Error::UnknownTable {
            name: table.to_string(),
        })?;
        if def.natural_key.is_empty() {
            return Err(Error::NoNaturalKey {
                name: def.name.clone(),
            });
        }

        let store = match &def.backend_name {
            Some(backend) => self.stores.get(backend).cloned(),
            None if self.stores.len() == 1 => self.stores.values().next().cloned(),
            None => None,
        };
        let store = store.ok_or_else(|| Error::UnknownBackend {
            table: def.name.clone(),
            backend: def.backend_name.clone().unwrap_or_else(|| "<unset>".to_string()),
        })?;
        Ok((def, store))
    }

    /// Reconcile `table` against `source` and apply the result.
    ///
    /// The table stays locked from reading the stored rows until the commit,
    /// so concurrent runs against one table never interleave.
    ///
    /// # Errors
    ///
    /// - [`Error::ReservedField`] if a source record carries the primary key
    ///   or a bookkeeping field; checked before the table is locked.
    /// - [`Error::Backend`] if a chunk or the commit fails. Nothing is
    ///   persisted in that case and the run can be retried. Counts are per
    ///   chunk: the failing chunk counts as attempted and failed.
    pub fn sync(&self, table: &str, source: Vec<Record>) -> Result<SyncReport> {
        let (def, store) = self.resolve(table)?;
        for (index, record) in source.iter().enumerate() {
            if let Some(field) = reserved_field(record, Some(def.primary_key.as_str())) {
                tracing::warn!(table = %def.name, index, field, "Source record carries a reserved field");
                return Err(Error::ReservedField {
                    table: def.name.clone(),
                    field: field.to_string(),
                });
            }
        }
        let detector = ChangeDetector::default().with_ignored(def.primary_key.clone());

        let mut tx = store.begin(&def.name)?;
        let result = reconcile_by_fields(source, tx.rows(), &def.natural_key, &detector)?;
        let mut report = SyncReport::planned(&def.name, store.name(), &result, self.options.dry_run);

        if self.options.dry_run || result.is_noop() {
            tracing::info!(
                table = %def.name,
                dry_run = self.options.dry_run,
                changes = report.changes(),
                "Sync finished without writing"
            );
            return Ok(report);
        }

        let total = result.write_count();
        let mut writes = result
            .inserts
            .into_iter()
            .map(Write::Insert)
            .chain(result.updates.into_iter().map(Write::Update))
            .chain(result.deactivations.into_iter().map(Write::Deactivate));

        let chunk_size = self.options.chunk_size.max(1);
        let mut done = 0;
        loop {
            let chunk: Vec<Write> = writes.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let len = chunk.len();
            if let Err(e) = tx.apply(chunk) {
                let counts = WriteCounts {
                    attempted: done + len,
                    succeeded: done,
                    failed: len,
                };
                tracing::warn!(table = %def.name, error = %e, written = done, total, "Sync chunk failed; rolling back");
                return Err(Error::Backend {
                    table: def.name.clone(),
                    message: e.to_string(),
                    counts,
                });
            }
            done += len;
            tracing::debug!(table = %def.name, written = done, total, "Applied write chunk");
        }

        tx.commit().map_err(|e| Error::Backend {
            table: def.name.clone(),
            message: format!("commit failed: {}", e),
            counts: WriteCounts {
                attempted: total,
                succeeded: 0,
                failed: total,
            },
        })?;

        report.attempted = total;
        report.committed = true;
        tracing::info!(
            table = %def.name,
            inserted = report.inserted,
            updated = report.updated,
            deactivated = report.deactivated,
            unchanged = report.unchanged,
            "Synchronized table"
        );
        Ok(report)
    }
}

//! In-memory record store

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

use super::{RecordStore, StoreTransaction, TableRows, Write};
use crate::reconcile::StoredRecord;
use crate::{Error, Result};

/// Process-local store, one mutex per table.
///
/// A transaction owns its table's mutex guard and works on a copy of the
/// rows; commit swaps the copy in.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    tables: Mutex<HashMap<String, Arc<Mutex<TableRows>>>>,
    write_limit: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Mutex::new(HashMap::new()),
            write_limit: None,
        }
    }

    /// Cap the writes one transaction may stage. A chunk that would exceed
    /// the cap fails as a whole.
    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Replace a table's rows, continuing ids after the highest one given.
    pub fn seed(&self, table: &str, rows: Vec<StoredRecord>) {
        let next_id = rows.iter().map(|r| r.id.0).max().unwrap_or(0);
        *self.table(table).lock() = TableRows { next_id, rows };
    }

    fn table(&self, table: &str) -> Arc<Mutex<TableRows>> {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .clone()
    }
}

impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, table: &str) -> Result<Vec<StoredRecord>> {
        Ok(self.table(table).lock().rows.clone())
    }

    fn begin(&self, table: &str) -> Result<Box<dyn StoreTransaction + '_>> {
        let guard = self.table(table).lock_arc();
        let staged = (*guard).clone();
        tracing::debug!(store = %self.name, table, "Began memory transaction");
        Ok(Box::new(MemoryTransaction {
            table: table.to_string(),
            guard,
            staged,
            writes: 0,
            write_limit: self.write_limit,
        }))
    }
}

struct MemoryTransaction {
    table: String,
    guard: ArcMutexGuard<RawMutex, TableRows>,
    staged: TableRows,
    writes: usize,
    write_limit: Option<usize>,
}

impl StoreTransaction for MemoryTransaction {
    fn table(&self) -> &str {
        &self.table
    }

    fn rows(&self) -> &[StoredRecord] {
        &self.staged.rows
    }

    fn apply(&mut self, batch: Vec<Write>) -> Result<()> {
        let len = batch.len();
        if let Some(limit) = self.write_limit.filter(|limit| self.writes + len > *limit) {
            return Err(Error::Store {
                table: self.table.clone(),
                message: format!(
                    "chunk of {} writes exceeds the limit of {} ({} staged)",
                    len, limit, self.writes
                ),
            });
        }
        self.staged.apply(&self.table, batch)?;
        self.writes += len;
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}

//! JSON file-backed record store

use unit_fs::{LockOptions, NormalizedPath, TableLockFile, io};

use super::{RecordStore, StoreTransaction, TableRows, Write};
use crate::reconcile::StoredRecord;
use crate::{Error, Result};

/// One pretty-printed JSON document per table under a root directory.
///
/// ```text
/// <root>/country.json   {"next_id": 3, "rows": [...]}
/// <root>/country.lock   exclusive lock held by open transactions
/// ```
///
/// Transactions hold the table's lock file for their whole lifetime and
/// commit with an atomic temp-and-rename, so a failed or abandoned run
/// leaves the previous document untouched.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    name: String,
    root: NormalizedPath,
    lock_options: LockOptions,
}

impl JsonFileStore {
    pub fn new(name: impl Into<String>, root: impl Into<NormalizedPath>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            lock_options: LockOptions::default(),
        }
    }

    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.lock_options = lock_options;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> NormalizedPath {
        self.root.join(&format!("{}.json", table))
    }

    fn lock_path(&self, table: &str) -> NormalizedPath {
        self.root.join(&format!("{}.lock", table))
    }

    fn load(&self, table: &str) -> Result<TableRows> {
        let path = self.table_path(table);
        if !path.exists() {
            return Ok(TableRows::default());
        }
        let content = io::read_text(&path)?;
        serde_json::from_str(&content).map_err(|e| Error::Store {
            table: table.to_string(),
            message: format!("corrupt table file {}: {}", path, e),
        })
    }
}

impl RecordStore for JsonFileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, table: &str) -> Result<Vec<StoredRecord>> {
        Ok(self.load(table)?.rows)
    }

    fn begin(&self, table: &str) -> Result<Box<dyn StoreTransaction + '_>> {
        let lock = TableLockFile::acquire(&self.lock_path(table), self.lock_options)?;
        let staged = self.load(table)?;
        Ok(Box::new(JsonFileTransaction {
            store: self,
            table: table.to_string(),
            staged,
            _lock: lock,
        }))
    }
}

struct JsonFileTransaction<'a> {
    store: &'a JsonFileStore,
    table: String,
    staged: TableRows,
    _lock: TableLockFile,
}

impl StoreTransaction for JsonFileTransaction<'_> {
    fn table(&self) -> &str {
        &self.table
    }

    fn rows(&self) -> &[StoredRecord] {
        &self.staged.rows
    }

    fn apply(&mut self, batch: Vec<Write>) -> Result<()> {
        self.staged.apply(&self.table, batch)
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let path = self.store.table_path(&self.table);
        let content = serde_json::to_string_pretty(&self.staged)?;
        io::write_text(&path, &content)?;
        tracing::debug!(table = %self.table, path = %path, rows = self.staged.rows.len(), "Committed table file");
        Ok(())
    }
}

//! Record stores
//!
//! A [`RecordStore`] keeps the rows of named tables. Writes go through a
//! [`StoreTransaction`], which holds the table's exclusive lock from
//! [`RecordStore::begin`] until it is committed or dropped. Dropping a
//! transaction without committing discards every staged write.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reconcile::{Record, RecordId, StoredRecord, Update, reserved_field};
use crate::{Error, Result};

/// Storage backend for reference tables.
pub trait RecordStore: Send + Sync {
    /// Backend name, matched against a table's `backend_name`.
    fn name(&self) -> &str;

    /// Snapshot of a table's rows. Unknown tables are empty.
    fn fetch(&self, table: &str) -> Result<Vec<StoredRecord>>;

    /// Open a write transaction, blocking while another holds the table.
    fn begin(&self, table: &str) -> Result<Box<dyn StoreTransaction + '_>>;
}

/// One write against a stored table.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(Record),
    /// Replace a row's fields, optionally marking it active again.
    Update(Update),
    Deactivate(RecordId),
}

/// Staged writes against one table.
pub trait StoreTransaction {
    fn table(&self) -> &str;

    /// Rows as seen by this transaction, including staged writes.
    fn rows(&self) -> &[StoredRecord];

    /// Stage one chunk of writes.
    ///
    /// A chunk is applied whole or not at all: on error the staged rows are
    /// as they were before the call.
    fn apply(&mut self, batch: Vec<Write>) -> Result<()>;

    /// Make every staged write visible at once.
    fn commit(self: Box<Self>) -> Result<()>;
}

/// Rows of one table plus its id sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TableRows {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub rows: Vec<StoredRecord>,
}

impl TableRows {
    /// Apply a chunk after checking every write in it.
    pub fn apply(&mut self, table: &str, batch: Vec<Write>) -> Result<()> {
        for write in &batch {
            self.check(table, write)?;
        }

        let now = Utc::now();
        for write in batch {
            match write {
                Write::Insert(record) => {
                    self.push(record, now);
                }
                Write::Update(update) => {
                    let row = self.row_mut(table, update.id)?;
                    row.fields = update.record;
                    if update.reactivate {
                        row.is_active = true;
                    }
                    row.modified_at = Some(now);
                }
                Write::Deactivate(id) => {
                    let row = self.row_mut(table, id)?;
                    row.is_active = false;
                    row.modified_at = Some(now);
                }
            }
        }
        Ok(())
    }

    fn check(&self, table: &str, write: &Write) -> Result<()> {
        let (record, id) = match write {
            Write::Insert(record) => (Some(record), None),
            Write::Update(update) => (Some(&update.record), Some(update.id)),
            Write::Deactivate(id) => (None, Some(*id)),
        };
        if let Some(field) = record.and_then(|r| reserved_field(r, None)) {
            return Err(Error::ReservedField {
                table: table.to_string(),
                field: field.to_string(),
            });
        }
        match id {
            Some(id) if !self.rows.iter().any(|row| row.id == id) => Err(Error::Store {
                table: table.to_string(),
                message: format!("no row with id {}", id),
            }),
            _ => Ok(()),
        }
    }

    fn push(&mut self, record: Record, now: DateTime<Utc>) -> RecordId {
        self.next_id += 1;
        let id = RecordId(self.next_id);
        self.rows.push(StoredRecord {
            id,
            is_active: true,
            created_at: Some(now),
            modified_at: Some(now),
            fields: record,
        });
        id
    }

    fn row_mut(&mut self, table: &str, id: RecordId) -> Result<&mut StoredRecord> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| Error::Store {
                table: table.to_string(),
                message: format!("no row with id {}", id),
            })
    }
}

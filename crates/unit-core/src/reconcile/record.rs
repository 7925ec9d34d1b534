//! Records and natural keys

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// A field-value record from a reference dataset.
pub type Record = serde_json::Map<String, Value>;

/// Fields owned by the store. Source records may not carry them.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "is_active", "created_at", "modified_at"];

/// First field of `record` that is reserved or names the table's primary key.
pub fn reserved_field<'a>(record: &'a Record, primary_key: Option<&str>) -> Option<&'a str> {
    record
        .keys()
        .map(String::as_str)
        .find(|field| RESERVED_FIELDS.contains(field) || Some(*field) == primary_key)
}

/// Surrogate identifier assigned by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A persisted record with its surrogate id and bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Record,
}

impl StoredRecord {
    pub fn new(id: RecordId, fields: Record) -> Self {
        Self {
            id,
            is_active: true,
            created_at: None,
            modified_at: None,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Values of a record's natural-key fields, in declared field order.
///
/// Each part is the canonical JSON text of the value, so `"1"` and `1`
/// are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey(Vec<String>);

impl NaturalKey {
    /// Extract the key made of `fields` from `record`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingKeyField`] if a field is absent or null.
    pub fn extract(record: &Record, fields: &[String]) -> Result<Self> {
        fields
            .iter()
            .map(|field| match record.get(field) {
                None | Some(Value::Null) => Err(Error::MissingKeyField {
                    field: field.clone(),
                }),
                Some(value) => Ok(value.to_string()),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Field comparison that ignores surrogate and bookkeeping fields.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    ignored: BTreeSet<String>,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self {
            ignored: RESERVED_FIELDS
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl ChangeDetector {
    pub fn with_ignored(mut self, field: impl Into<String>) -> Self {
        self.ignored.insert(field.into());
        self
    }

    /// Whether any meaningful field differs. Missing fields compare as null.
    pub fn changed(&self, source: &Record, stored: &StoredRecord) -> bool {
        let fields: BTreeSet<&String> = source.keys().chain(stored.fields.keys()).collect();
        fields
            .into_iter()
            .filter(|field| !self.ignored.contains(field.as_str()))
            .any(|field| {
                source.get(field).unwrap_or(&Value::Null)
                    != stored.fields.get(field).unwrap_or(&Value::Null)
            })
    }
}

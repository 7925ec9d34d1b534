//! Error types for unit-core

use unit_meta::ArtifactKind;

/// Result type for unit-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Counts carried by a failed reconciliation write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Errors that can occur in unit-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unit configuration failed validation; every problem is listed
    #[error("Invalid configuration for unit {unit}:\n  - {}", errors.join("\n  - "))]
    Configuration { unit: String, errors: Vec<String> },

    /// Artifact name already carries the unit's prefix
    #[error("{kind} '{name}' already starts with prefix '{prefix}_'; refusing to prefix it twice")]
    AlreadyPrefixed {
        kind: ArtifactKind,
        name: String,
        prefix: String,
    },

    /// Producer returned something other than what it declared
    #[error("Producer for {expected_kind} '{expected_name}' produced {kind} '{name}'")]
    ProducerMismatch {
        expected_kind: ArtifactKind,
        expected_name: String,
        kind: ArtifactKind,
        name: String,
    },

    /// Producer reported a failure
    #[error("Producer for {kind} '{name}' failed: {message}")]
    ProducerFailed {
        kind: ArtifactKind,
        name: String,
        message: String,
    },

    /// Two records share a natural key
    #[error("Duplicate natural key {key} in {origin} records")]
    DuplicateNaturalKey { origin: &'static str, key: String },

    /// A record lacks a natural-key field
    #[error("Record is missing natural key field '{field}'")]
    MissingKeyField { field: String },

    /// A source record carries a field the store assigns itself
    #[error("Record for table '{table}' carries reserved field '{field}'")]
    ReservedField { table: String, field: String },

    /// Table is not in the registry
    #[error("Unknown table: {name}")]
    UnknownTable { name: String },

    /// No configured store serves the table's backend
    #[error("No store for backend '{backend}' of table '{table}'")]
    UnknownBackend { table: String, backend: String },

    /// Table has no natural key to reconcile on
    #[error("Table '{name}' declares no natural key")]
    NoNaturalKey { name: String },

    /// Storage backend failed; the run was rolled back and may be retried
    #[error(
        "Backend error on table '{table}': {message} ({} attempted, {} succeeded, {} failed; rolled back)",
        counts.attempted,
        counts.succeeded,
        counts.failed
    )]
    Backend {
        table: String,
        message: String,
        counts: WriteCounts,
    },

    /// A single store operation failed
    #[error("Store error on table '{table}': {message}")]
    Store { table: String, message: String },

    /// No catalog unit satisfies a manifest entry
    #[error("No available unit matches {unit} {requirement}")]
    UnresolvedUnit { unit: String, requirement: String },

    /// Application manifest is invalid; every problem is listed
    #[error("Invalid manifest {path}:\n  - {}", errors.join("\n  - "))]
    Manifest { path: String, errors: Vec<String> },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from unit-fs
    #[error(transparent)]
    Fs(#[from] unit_fs::Error),

    /// Metadata error from unit-meta (collisions, duplicate registrations)
    #[error(transparent)]
    Meta(#[from] unit_meta::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether a retry of the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Backend { .. } | Error::Fs(unit_fs::Error::LockFailed { .. })
        )
    }
}

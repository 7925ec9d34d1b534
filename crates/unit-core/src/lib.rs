//! Core engines of the unit registry
//!
//! This crate provides:
//!
//! - **Composition**: installs a unit's artifacts into the shared
//!   [`unit_meta::Registry`] with prefixing, provenance and rollback
//! - **Reconciliation**: natural-key diff of reference datasets against
//!   stored rows
//! - **Stores and sync**: transactional record stores and the
//!   [`SyncEngine`] applying reconciliation results
//! - **Manifest and catalog**: the `units.toml` application manifest and the
//!   explicit list of units an application ships
//!
//! # Architecture
//!
//! ```text
//!              unit-cli
//!                 |
//!    unit-core  unit-reference
//!        |            |
//!   +----+-----+------+------+
//!   |          |             |
//! unit-fs  unit-meta   unit-template
//! ```

pub mod catalog;
pub mod compose;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod reconcile;
pub mod store;
pub mod sync;

pub use catalog::{UnitCatalog, UnitFactory, compose_manifest};
pub use compose::{
    ComposeOptions, CompositionReport, Producer, ProducerSet, StaticProducer, compose, compose_with,
};
pub use error::{Error, Result, WriteCounts};
pub use manifest::{AppManifest, AppSection, UnitEntry};
pub use reconcile::{
    ChangeDetector, NaturalKey, Record, RecordId, ReconciliationResult, StoredRecord, Update,
    reconcile, reconcile_by_fields,
};
pub use store::{JsonFileStore, MemoryStore, RecordStore, StoreTransaction, Write};
pub use sync::{SyncEngine, SyncOptions, SyncReport, load_records};

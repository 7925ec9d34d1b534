//! Reference-data synchronization
//!
//! - [`SyncEngine`] reconciles a registry table against a dataset and writes
//!   the result to a [`crate::store::RecordStore`]
//! - [`load_records`] reads datasets from JSON, TOML or YAML

mod engine;
mod source;

pub use engine::{DEFAULT_CHUNK_SIZE, SyncEngine, SyncOptions, SyncReport};
pub use source::{load_records, parse_json_records};

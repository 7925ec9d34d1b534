//! Filesystem helpers for the unit registry.
//!
//! Provides normalized paths, atomic locked writes, exclusive lock files for
//! per-table write scopes, and format-agnostic loading of settings and
//! datasets.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use checksum::{compute_content_checksum, compute_file_checksum};
pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use io::{LockOptions, TableLockFile};
pub use path::NormalizedPath;

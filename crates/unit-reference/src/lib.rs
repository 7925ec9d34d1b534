//! Built-in geographic reference-data unit.
//!
//! The `io.units:geo` unit contributes three levels of reference tables
//! (country, state, city), a lookup source and a sync process per level and
//! an overview widget. It ships:
//!
//! - bundled datasets for every level, synchronized with [`sync_bundled`]
//! - a schema changelog template rendered with [`render_changelog`]
//!
//! The `states` and `cities` features switch levels off; a disabled level
//! takes every level below it along.

pub mod changelog;
pub mod config;
pub mod data;
pub mod error;
pub mod producers;
pub mod tables;
pub mod unit;

pub use changelog::{GEO_CHANGELOG, changelog_parameters, changelog_template, render_changelog};
pub use config::GeoConfig;
pub use data::{bundled_records, bundled_source};
pub use error::{Error, Result};
pub use producers::{OVERVIEW_WIDGET, TableProducer, geo_producers};
pub use tables::GeoLevel;
pub use unit::{GeoUnit, sync_bundled};

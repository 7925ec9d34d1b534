//! Unit composition
//!
//! Turns a [`unit_meta::UnitDescriptor`] plus its [`ProducerSet`] into
//! registry entries. See [`compose_with`] for the full sequence.

mod engine;
mod prefix;
mod producer;

pub use engine::{ComposeOptions, CompositionReport, compose, compose_with};
pub use prefix::{apply_prefix, prefixed_name};
pub use producer::{Producer, ProducerSet, StaticProducer};

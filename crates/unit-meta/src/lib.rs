//! Unit metadata for the unit registry.
//!
//! This crate provides the identity and configuration contract of a unit,
//! the artifact variants units produce, and the [`Registry`] they are
//! composed into.

pub mod artifact;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod identity;
pub mod registry;

pub use artifact::{
    Artifact, ArtifactKind, FieldDef, FieldType, LookupSourceDef, ProcessDef, ProducedArtifact,
    TableDef, WidgetDef,
};
pub use config::{ArtifactSelector, UnitConfig, UnitSettings};
pub use descriptor::UnitDescriptor;
pub use error::{Error, Result};
pub use identity::{Provenance, UnitId, UnitKey};
pub use registry::{ArtifactKey, Registry, UnitRegistration};

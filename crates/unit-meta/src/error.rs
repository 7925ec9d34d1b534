//! Error types for unit-meta

use crate::artifact::ArtifactKind;
use crate::identity::Provenance;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] unit_fs::Error),

    #[error("Invalid unit identity '{value}': {reason}")]
    InvalidIdentity { value: String, reason: String },

    #[error("Invalid artifact selector '{value}': {reason}")]
    InvalidSelector { value: String, reason: String },

    #[error("Unknown artifact kind: {value}")]
    UnknownKind { value: String },

    #[error(
        "{kind} '{name}' from {incoming} collides with the one registered by {existing}"
    )]
    Collision {
        kind: ArtifactKind,
        name: String,
        existing: Provenance,
        incoming: Provenance,
    },

    #[error("Unit {key} is already registered (version {version})")]
    DuplicateUnit { key: String, version: String },
}

//! The shared application registry
//!
//! All units populate one [`Registry`]. Artifacts are keyed by
//! (kind, name); two artifacts of the same kind may never share a name.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::artifact::{ArtifactKind, ProducedArtifact, TableDef};
use crate::error::{Error, Result};
use crate::identity::{Provenance, UnitId, UnitKey};

/// Lookup key of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ArtifactKey {
    pub kind: ArtifactKind,
    pub name: String,
}

impl ArtifactKey {
    pub fn new(kind: ArtifactKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Record of a unit instance installed into the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRegistration {
    pub id: UnitId,
    pub namespace: Option<String>,
    pub backend_name: Option<String>,
    pub table_prefix: Option<String>,
}

impl UnitRegistration {
    pub fn key(&self) -> UnitKey {
        self.id.key(self.namespace.as_deref())
    }
}

/// Registry of artifacts produced by units.
///
/// # Example
///
/// ```
/// use unit_meta::{Artifact, ArtifactKind, ProducedArtifact, Provenance, Registry, TableDef, UnitId};
///
/// let mut registry = Registry::new();
/// let provenance = Provenance {
///     unit: UnitId::new("io.units", "geo", "1.0.0").unwrap(),
///     namespace: None,
/// };
/// registry
///     .insert(ProducedArtifact::new(Artifact::Table(TableDef::new("country")), provenance))
///     .unwrap();
/// assert!(registry.contains(ArtifactKind::Table, "country"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    artifacts: BTreeMap<ArtifactKey, ProducedArtifact>,
    units: BTreeMap<UnitKey, UnitRegistration>,
    backends: BTreeSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a storage backend known to the application.
    pub fn add_backend(&mut self, name: impl Into<String>) {
        self.backends.insert(name.into());
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains(name)
    }

    pub fn has_backends(&self) -> bool {
        !self.backends.is_empty()
    }

    pub fn backends(&self) -> impl Iterator<Item = &str> {
        self.backends.iter().map(String::as_str)
    }

    /// Insert an artifact.
    ///
    /// This is the single write point used by `unit_core::compose`, which
    /// also registers the producing unit and rolls back on failure. Direct
    /// callers get collision checks but no unit bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Collision`] naming both units if an artifact of the
    /// same kind and name is already present. The registry is unchanged.
    pub fn insert(&mut self, produced: ProducedArtifact) -> Result<()> {
        let key = ArtifactKey::new(produced.kind(), produced.name());
        if let Some(existing) = self.artifacts.get(&key) {
            return Err(Error::Collision {
                kind: key.kind,
                name: key.name,
                existing: existing.provenance.clone(),
                incoming: produced.provenance,
            });
        }
        self.artifacts.insert(key, produced);
        Ok(())
    }

    /// Remove an artifact produced by `owner`, returning it.
    ///
    /// Artifacts of other units are left in place and `None` is returned.
    /// Used by composition rollback.
    pub fn withdraw(
        &mut self,
        kind: ArtifactKind,
        name: &str,
        owner: &Provenance,
    ) -> Option<ProducedArtifact> {
        let key = ArtifactKey::new(kind, name);
        if self.artifacts.get(&key)?.provenance != *owner {
            return None;
        }
        self.artifacts.remove(&key)
    }

    pub fn get(&self, kind: ArtifactKind, name: &str) -> Option<&ProducedArtifact> {
        self.artifacts.get(&ArtifactKey::new(kind, name))
    }

    pub fn contains(&self, kind: ArtifactKind, name: &str) -> bool {
        self.get(kind, name).is_some()
    }

    /// Look up a table definition by (prefixed) name.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.get(ArtifactKind::Table, name)
            .and_then(|p| p.artifact.as_table())
    }

    /// All artifacts ordered by kind, then name.
    pub fn iter(&self) -> impl Iterator<Item = &ProducedArtifact> {
        self.artifacts.values()
    }

    pub fn by_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &ProducedArtifact> {
        self.artifacts.values().filter(move |p| p.kind() == kind)
    }

    /// Artifacts produced by one unit instance.
    pub fn by_provenance<'a>(
        &'a self,
        provenance: &'a Provenance,
    ) -> impl Iterator<Item = &'a ProducedArtifact> + 'a {
        self.artifacts
            .values()
            .filter(move |p| &p.provenance == provenance)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Record a unit instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateUnit`] if the same unit is already
    /// registered under the same namespace.
    pub fn register_unit(&mut self, registration: UnitRegistration) -> Result<()> {
        let key = registration.key();
        if let Some(existing) = self.units.get(&key) {
            return Err(Error::DuplicateUnit {
                key: key.to_string(),
                version: existing.id.version.clone(),
            });
        }
        tracing::debug!(unit = %key, version = %registration.id.version, "Registered unit");
        self.units.insert(key, registration);
        Ok(())
    }

    pub fn unregister_unit(&mut self, key: &UnitKey) -> Option<UnitRegistration> {
        self.units.remove(key)
    }

    pub fn unit(&self, key: &UnitKey) -> Option<&UnitRegistration> {
        self.units.get(key)
    }

    pub fn units(&self) -> impl Iterator<Item = &UnitRegistration> {
        self.units.values()
    }
}

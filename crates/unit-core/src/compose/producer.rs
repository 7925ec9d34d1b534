//! Artifact producers and their registration list

use std::fmt;

use unit_meta::{Artifact, ArtifactKind, Registry};

use crate::Result;

/// Produces one artifact for a unit.
///
/// Producers declare the kind and unprefixed name of what they make so the
/// composition engine can filter them before invoking them. `produce`
/// receives a read-only view of the registry and must not depend on
/// artifacts of the unit being composed.
pub trait Producer: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    /// Unprefixed artifact name.
    fn name(&self) -> &str;

    /// Producers run in ascending sort key order. Ties keep registration order.
    fn sort_key(&self) -> i32 {
        0
    }

    /// Self-enablement, checked before the configuration predicate.
    fn is_enabled(&self) -> bool {
        true
    }

    fn produce(&self, registry: &Registry) -> Result<Artifact>;
}

/// Explicit, ordered list of a unit's producers.
#[derive(Default)]
pub struct ProducerSet {
    producers: Vec<Box<dyn Producer>>,
}

impl ProducerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, producer: impl Producer + 'static) {
        self.producers.push(Box::new(producer));
    }

    pub fn with(mut self, producer: impl Producer + 'static) -> Self {
        self.register(producer);
        self
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Producers sorted by sort key, stable with respect to registration.
    pub fn ordered(&self) -> Vec<&dyn Producer> {
        let mut ordered: Vec<&dyn Producer> = self.producers.iter().map(|p| p.as_ref()).collect();
        ordered.sort_by_key(|p| p.sort_key());
        ordered
    }
}

impl fmt::Debug for ProducerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.producers.iter().map(|p| format!("{}:{}", p.kind(), p.name())))
            .finish()
    }
}

/// Producer returning a fixed artifact. Handy for static metadata and tests.
#[derive(Debug, Clone)]
pub struct StaticProducer {
    artifact: Artifact,
    sort_key: i32,
    enabled: bool,
}

impl StaticProducer {
    pub fn new(artifact: impl Into<Artifact>) -> Self {
        Self {
            artifact: artifact.into(),
            sort_key: 0,
            enabled: true,
        }
    }

    pub fn with_sort_key(mut self, sort_key: i32) -> Self {
        self.sort_key = sort_key;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Producer for StaticProducer {
    fn kind(&self) -> ArtifactKind {
        self.artifact.kind()
    }

    fn name(&self) -> &str {
        self.artifact.name()
    }

    fn sort_key(&self) -> i32 {
        self.sort_key
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn produce(&self, _registry: &Registry) -> Result<Artifact> {
        Ok(self.artifact.clone())
    }
}

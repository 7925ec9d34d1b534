//! Unit descriptors

use std::sync::Arc;

use crate::config::UnitConfig;
use crate::identity::{Provenance, UnitId, UnitKey};

/// One deployable instance of a unit: identity, optional namespace and the
/// configuration it was deployed with.
///
/// Constructed by the application and handed to the composition engine once.
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    id: UnitId,
    namespace: Option<String>,
    config: Arc<dyn UnitConfig>,
}

impl UnitDescriptor {
    pub fn new(id: UnitId, config: impl UnitConfig + 'static) -> Self {
        Self {
            id,
            namespace: None,
            config: Arc::new(config),
        }
    }

    /// Build from an already shared configuration.
    pub fn from_shared(id: UnitId, config: Arc<dyn UnitConfig>) -> Self {
        Self {
            id,
            namespace: None,
            config,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn config(&self) -> &dyn UnitConfig {
        self.config.as_ref()
    }

    pub fn key(&self) -> UnitKey {
        self.id.key(self.namespace())
    }

    pub fn provenance(&self) -> Provenance {
        Provenance {
            unit: self.id.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

//! Unit catalog
//!
//! Applications list the units they ship explicitly; nothing is discovered
//! at runtime. A manifest entry is resolved to the first catalog unit whose
//! coordinates and version satisfy it.

use unit_meta::{Registry, UnitDescriptor, UnitId, UnitSettings};

use crate::compose::{ComposeOptions, CompositionReport, ProducerSet, compose_with};
use crate::manifest::{AppManifest, UnitEntry};
use crate::{Error, Result};

/// A unit that can be instantiated from manifest settings.
pub trait UnitFactory: Send + Sync {
    fn id(&self) -> &UnitId;

    /// Short human description shown by `unit units`.
    fn description(&self) -> &str {
        ""
    }

    /// Build the descriptor and producers for one deployment.
    fn instantiate(
        &self,
        namespace: Option<&str>,
        settings: &UnitSettings,
    ) -> Result<(UnitDescriptor, ProducerSet)>;
}

/// Registration list of available units.
#[derive(Default)]
pub struct UnitCatalog {
    factories: Vec<Box<dyn UnitFactory>>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: impl UnitFactory + 'static) {
        self.factories.push(Box::new(factory));
    }

    pub fn with(mut self, factory: impl UnitFactory + 'static) -> Self {
        self.register(factory);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn UnitFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    /// Resolve a manifest entry.
    pub fn resolve(&self, entry: &UnitEntry) -> Result<&dyn UnitFactory> {
        self.iter()
            .find(|f| entry.accepts(f.id()))
            .ok_or_else(|| Error::UnresolvedUnit {
                unit: entry.label(),
                requirement: entry.version.clone(),
            })
    }
}

/// Compose every unit of `manifest`, in manifest order, into `registry`.
///
/// Stops at the first failing unit; units composed before it stay.
pub fn compose_manifest(
    registry: &mut Registry,
    manifest: &AppManifest,
    catalog: &UnitCatalog,
    options: &ComposeOptions,
) -> Result<Vec<CompositionReport>> {
    let mut reports = Vec::with_capacity(manifest.units.len());
    for entry in &manifest.units {
        let factory = catalog.resolve(entry)?;
        let (descriptor, producers) =
            factory.instantiate(entry.namespace.as_deref(), &entry.settings)?;
        tracing::debug!(unit = %descriptor.provenance(), producers = producers.len(), "Composing manifest unit");
        reports.push(compose_with(registry, &descriptor, &producers, options)?);
    }
    Ok(reports)
}

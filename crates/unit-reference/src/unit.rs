//! The geo unit as a catalog entry

use unit_core::{ProducerSet, Result, SyncEngine, SyncReport, UnitFactory};
use unit_meta::{UnitDescriptor, UnitId, UnitSettings};

use crate::config::GeoConfig;
use crate::data::bundled_records;
use crate::producers::geo_producers;
use crate::tables::GeoLevel;

pub const GROUP: &str = "io.units";
pub const ARTIFACT: &str = "geo";

/// Countries, states and cities with bundled reference data.
#[derive(Debug, Clone)]
pub struct GeoUnit {
    id: UnitId,
}

impl GeoUnit {
    /// The unit at this crate's version.
    pub fn new() -> Result<Self> {
        Ok(Self {
            id: UnitId::new(GROUP, ARTIFACT, env!("CARGO_PKG_VERSION"))?,
        })
    }

    /// Descriptor and producers for one deployment.
    pub fn deploy(&self, namespace: Option<&str>, config: GeoConfig) -> (UnitDescriptor, ProducerSet) {
        let deepest = config.enabled_levels().last().copied().unwrap_or(GeoLevel::Country);
        let mut descriptor = UnitDescriptor::new(self.id.clone(), config);
        if let Some(ns) = namespace {
            descriptor = descriptor.with_namespace(ns);
        }
        (descriptor, geo_producers(deepest))
    }
}

impl UnitFactory for GeoUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn description(&self) -> &str {
        "Countries, states and cities with bundled reference data"
    }

    fn instantiate(
        &self,
        namespace: Option<&str>,
        settings: &UnitSettings,
    ) -> Result<(UnitDescriptor, ProducerSet)> {
        Ok(self.deploy(namespace, GeoConfig::new(settings.clone())))
    }
}

/// Synchronize the bundled datasets into the unit's composed tables,
/// parents first. Stops at the first failing table.
pub fn sync_bundled(engine: &SyncEngine<'_>, config: &GeoConfig) -> crate::Result<Vec<SyncReport>> {
    let mut reports = Vec::new();
    for level in config.enabled_levels() {
        let table = config.table_name(level);
        let report = engine.sync(&table, bundled_records(level)?)?;
        tracing::info!(
            table = %table,
            inserted = report.inserted,
            updated = report.updated,
            deactivated = report.deactivated,
            "Synchronized bundled data"
        );
        reports.push(report);
    }
    Ok(reports)
}

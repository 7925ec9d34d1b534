//! Producers of the geo unit

use unit_core::{Producer, ProducerSet, Result, StaticProducer};
use unit_meta::{Artifact, ArtifactKind, LookupSourceDef, ProcessDef, Registry, WidgetDef};

use crate::tables::GeoLevel;

/// Name of the overview widget.
pub const OVERVIEW_WIDGET: &str = "geo_overview";

/// Produces the table of one level.
#[derive(Debug, Clone, Copy)]
pub struct TableProducer {
    level: GeoLevel,
}

impl TableProducer {
    pub fn new(level: GeoLevel) -> Self {
        Self { level }
    }
}

impl Producer for TableProducer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Table
    }

    fn name(&self) -> &str {
        self.level.name()
    }

    fn sort_key(&self) -> i32 {
        self.level as i32
    }

    fn produce(&self, _registry: &Registry) -> Result<Artifact> {
        Ok(Artifact::Table(self.level.table()))
    }
}

/// Widget launching the country sync, labelled with the deepest level.
#[derive(Debug, Clone)]
struct OverviewProducer {
    deepest: GeoLevel,
}

impl Producer for OverviewProducer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Widget
    }

    fn name(&self) -> &str {
        OVERVIEW_WIDGET
    }

    fn sort_key(&self) -> i32 {
        30
    }

    fn produce(&self, _registry: &Registry) -> Result<Artifact> {
        let label = match self.deepest {
            GeoLevel::Country => "Countries",
            GeoLevel::State => "Countries and states",
            GeoLevel::City => "Countries, states and cities",
        };
        Ok(Artifact::Widget(WidgetDef {
            name: OVERVIEW_WIDGET.to_string(),
            label: Some(label.to_string()),
            process: Some(GeoLevel::Country.process_name()),
        }))
    }
}

/// Every producer of the unit.
///
/// Per level: the table, a lookup source over it and a sync process. The
/// configuration decides which of them run.
pub fn geo_producers(deepest: GeoLevel) -> ProducerSet {
    let mut set = ProducerSet::new();
    for level in GeoLevel::ALL {
        set.register(TableProducer::new(level));
        set.register(
            StaticProducer::new(LookupSourceDef {
                name: level.name().to_string(),
                table: level.name().to_string(),
                value_field: "id".to_string(),
                label_field: "name".to_string(),
            })
            .with_sort_key(10 + level as i32),
        );
        set.register(
            StaticProducer::new(ProcessDef {
                name: level.process_name(),
                label: Some(format!("Synchronize {} reference data", level)),
                table: Some(level.name().to_string()),
            })
            .with_sort_key(20 + level as i32),
        );
    }
    set.register(OverviewProducer { deepest });
    set
}

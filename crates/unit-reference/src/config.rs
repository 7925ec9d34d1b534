//! Configuration of the geo unit

use std::collections::BTreeSet;

use unit_meta::{ArtifactKind, Registry, TableDef, UnitConfig, UnitSettings};

use crate::tables::GeoLevel;

const FEATURES: [&str; 2] = ["states", "cities"];

/// Geo unit configuration: the standard [`UnitSettings`] plus the
/// `states` and `cities` feature flags.
///
/// Switching a level off also switches off every level below it, so
/// `states = false` implies no cities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoConfig {
    settings: UnitSettings,
}

impl GeoConfig {
    pub fn new(settings: UnitSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &UnitSettings {
        &self.settings
    }

    /// Whether `level` and all of its parents are switched on.
    pub fn is_level_enabled(&self, level: GeoLevel) -> bool {
        let own = level
            .feature()
            .is_none_or(|feature| self.settings.is_feature_enabled(feature));
        own && level.parent().is_none_or(|parent| self.is_level_enabled(parent))
    }

    /// Levels whose table is produced, parents first.
    pub fn enabled_levels(&self) -> Vec<GeoLevel> {
        GeoLevel::ALL
            .into_iter()
            .filter(|level| {
                self.is_level_enabled(*level)
                    && self.settings.is_artifact_enabled(ArtifactKind::Table, level.name())
            })
            .collect()
    }

    /// Final name of a level's table in the registry.
    pub fn table_name(&self, level: GeoLevel) -> String {
        match &self.settings.table_prefix {
            Some(prefix) => format!("{}_{}", prefix, level.name()),
            None => level.name().to_string(),
        }
    }

    /// Changelog sections to leave out: the explicitly disabled ones and
    /// those of every level whose table is not produced.
    pub fn disabled_sections(&self) -> BTreeSet<String> {
        let enabled = self.enabled_levels();
        let mut sections: BTreeSet<String> = self.settings.disabled_sections.iter().cloned().collect();
        sections.extend(
            GeoLevel::ALL
                .into_iter()
                .filter(|level| !enabled.contains(level))
                .map(|level| level.name().to_string()),
        );
        sections
    }
}

impl From<UnitSettings> for GeoConfig {
    fn from(settings: UnitSettings) -> Self {
        Self::new(settings)
    }
}

impl UnitConfig for GeoConfig {
    fn validate(&self, registry: &Registry, errors: &mut Vec<String>) {
        self.settings.validate(registry, errors);

        for feature in self.settings.features.keys() {
            if !FEATURES.contains(&feature.as_str()) {
                errors.push(format!(
                    "features: unknown feature '{}' (expected one of: {})",
                    feature,
                    FEATURES.join(", ")
                ));
            }
        }

        for section in &self.settings.disabled_sections {
            if !section.trim().is_empty() && GeoLevel::from_name(section).is_none() {
                errors.push(format!(
                    "disabled_sections: unknown section '{}' (expected country, state or city)",
                    section
                ));
            }
        }

        if !self.settings.is_artifact_enabled(ArtifactKind::Table, "country") {
            errors.push("the country table cannot be disabled".to_string());
        }
    }

    fn default_backend_name(&self) -> Option<&str> {
        self.settings.default_backend_name()
    }

    fn table_name_prefix(&self) -> Option<&str> {
        self.settings.table_name_prefix()
    }

    fn is_artifact_enabled(&self, kind: ArtifactKind, name: &str) -> bool {
        if !self.settings.is_artifact_enabled(kind, name) {
            return false;
        }
        match GeoLevel::of_artifact(name) {
            // Lookups and processes go with their table.
            Some(level) => {
                self.is_level_enabled(level)
                    && self.settings.is_artifact_enabled(ArtifactKind::Table, level.name())
            }
            None => true,
        }
    }

    fn customize_table(&self, table: &mut TableDef) {
        self.settings.customize_table(table);
    }
}

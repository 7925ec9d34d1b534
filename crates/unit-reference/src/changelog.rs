//! Schema changelog of the geo unit
//!
//! The bundled template has one section per level. Sections of levels the
//! configuration leaves out are removed, and table names carry the unit's
//! prefix, so the rendered changelog matches the composed tables.

use unit_meta::UnitConfig;
use unit_template::{Parameters, SchemaTemplate};

use crate::Result;
use crate::config::GeoConfig;

/// Source of the bundled changelog template.
pub const GEO_CHANGELOG: &str = include_str!("../templates/geo_changelog.xml");

/// Backend written into the changelog when the unit has none configured.
pub const DEFAULT_BACKEND: &str = "default";

pub fn changelog_template() -> Result<SchemaTemplate> {
    Ok(SchemaTemplate::parse("geo_changelog.xml", GEO_CHANGELOG)?)
}

/// Template parameters derived from the configuration.
pub fn changelog_parameters(config: &GeoConfig, author: &str, changeset: &str) -> Parameters {
    let table_prefix = config
        .table_name_prefix()
        .map(|prefix| format!("{}_", prefix))
        .unwrap_or_default();
    let backend = config.default_backend_name().unwrap_or(DEFAULT_BACKEND);

    Parameters::from([
        ("table_prefix".to_string(), table_prefix),
        ("backend".to_string(), backend.to_string()),
        ("author".to_string(), author.to_string()),
        ("changeset".to_string(), changeset.to_string()),
    ])
}

/// Render the changelog for one deployment of the unit.
pub fn render_changelog(config: &GeoConfig, author: &str, changeset: &str) -> Result<String> {
    let template = changelog_template()?;
    let rendered = template.render(
        &changelog_parameters(config, author, changeset),
        &config.disabled_sections(),
    )?;
    tracing::debug!(
        template = template.name(),
        disabled = config.disabled_sections().len(),
        "Rendered geo changelog"
    );
    Ok(rendered)
}

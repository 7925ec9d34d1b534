//! Bundled reference datasets

use unit_core::Record;
use unit_core::sync::parse_json_records;

use crate::tables::GeoLevel;
use crate::{Error, Result};

const COUNTRIES: &str = include_str!("../data/countries.json");
const STATES: &str = include_str!("../data/states.json");
const CITIES: &str = include_str!("../data/cities.json");

/// Raw JSON of the dataset shipped for `level`.
pub fn bundled_source(level: GeoLevel) -> &'static str {
    match level {
        GeoLevel::Country => COUNTRIES,
        GeoLevel::State => STATES,
        GeoLevel::City => CITIES,
    }
}

/// Records shipped for `level`.
///
/// Every record is checked to carry the level's natural-key fields as
/// strings.
pub fn bundled_records(level: GeoLevel) -> Result<Vec<Record>> {
    let records = parse_json_records(bundled_source(level)).map_err(|e| Error::BundledData {
        name: level.name().to_string(),
        message: e.to_string(),
    })?;

    let table = level.table();
    for (index, record) in records.iter().enumerate() {
        if let Some(field) = table
            .natural_key
            .iter()
            .find(|field| !record.get(field.as_str()).is_some_and(|v| v.is_string()))
        {
            return Err(Error::BundledData {
                name: level.name().to_string(),
                message: format!("record {} has no string '{}'", index, field),
            });
        }
    }
    Ok(records)
}

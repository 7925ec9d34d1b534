//! Geographic levels and their table definitions

use std::fmt;

use unit_meta::{FieldDef, FieldType, TableDef};

/// One level of the country / state / city hierarchy.
///
/// Each level owns a table, a lookup source and a sync process, all named
/// after [`GeoLevel::name`]. A level requires its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeoLevel {
    Country,
    State,
    City,
}

impl GeoLevel {
    /// Parents before children.
    pub const ALL: [GeoLevel; 3] = [GeoLevel::Country, GeoLevel::State, GeoLevel::City];

    pub fn name(&self) -> &'static str {
        match self {
            GeoLevel::Country => "country",
            GeoLevel::State => "state",
            GeoLevel::City => "city",
        }
    }

    pub fn parent(&self) -> Option<GeoLevel> {
        match self {
            GeoLevel::Country => None,
            GeoLevel::State => Some(GeoLevel::Country),
            GeoLevel::City => Some(GeoLevel::State),
        }
    }

    /// Feature flag switching this level off, if it can be switched off.
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            GeoLevel::Country => None,
            GeoLevel::State => Some("states"),
            GeoLevel::City => Some("cities"),
        }
    }

    /// Name of the process that synchronizes this level's table.
    pub fn process_name(&self) -> String {
        format!("{}_sync", self.name())
    }

    /// Level owning the unprefixed artifact `name`, if any.
    pub fn of_artifact(name: &str) -> Option<GeoLevel> {
        let base = name.strip_suffix("_sync").unwrap_or(name);
        Self::ALL.into_iter().find(|level| level.name() == base)
    }

    pub fn from_name(name: &str) -> Option<GeoLevel> {
        Self::ALL.into_iter().find(|level| level.name() == name)
    }

    /// Table definition, unprefixed and without a backend.
    pub fn table(&self) -> TableDef {
        match self {
            GeoLevel::Country => TableDef::new("country")
                .with_label("Country")
                .with_natural_key(["code"])
                .with_field(code("code", 2).with_label("ISO 3166-1 alpha-2"))
                .with_field(FieldDef::new("iso3", FieldType::String).with_max_length(3))
                .with_field(name_field()),
            GeoLevel::State => TableDef::new("state")
                .with_label("State")
                .with_natural_key(["country_code", "code"])
                .with_field(code("country_code", 2))
                .with_field(code("code", 10))
                .with_field(name_field()),
            GeoLevel::City => TableDef::new("city")
                .with_label("City")
                .with_natural_key(["country_code", "state_code", "name"])
                .with_field(code("country_code", 2))
                .with_field(code("state_code", 10))
                .with_field(name_field()),
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn code(name: &str, max_length: usize) -> FieldDef {
    FieldDef::new(name, FieldType::String)
        .required()
        .with_max_length(max_length)
}

fn name_field() -> FieldDef {
    FieldDef::new("name", FieldType::String)
        .required()
        .with_max_length(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("country", Some(GeoLevel::Country))]
    #[case("state_sync", Some(GeoLevel::State))]
    #[case("city", Some(GeoLevel::City))]
    #[case("geo_overview", None)]
    #[case("_sync", None)]
    fn artifacts_map_to_levels(#[case] name: &str, #[case] expected: Option<GeoLevel>) {
        assert_eq!(GeoLevel::of_artifact(name), expected);
    }

    #[test]
    fn natural_key_fields_are_declared_and_required() {
        for level in GeoLevel::ALL {
            let table = level.table();
            assert_eq!(table.name, level.name());
            for field in &table.natural_key {
                let def = table.field(field).unwrap();
                assert!(def.required, "{}.{} should be required", level, field);
            }
        }
    }

    #[test]
    fn every_level_but_country_has_a_parent_and_a_feature() {
        assert_eq!(GeoLevel::Country.parent(), None);
        assert_eq!(GeoLevel::City.parent(), Some(GeoLevel::State));
        assert_eq!(GeoLevel::State.feature(), Some("states"));
        assert!(GeoLevel::Country.feature().is_none());
    }
}

//! Unit configuration contract and the standard settings type
//!
//! Every unit carries one [`UnitConfig`]. The composition engine only relies
//! on the trait: validation, the default backend, the optional table-name
//! prefix and the enabled-artifact predicate. [`UnitSettings`] is the
//! serde-backed implementation loaded from an application manifest.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactKind, TableDef};
use crate::error::Error;
use crate::registry::Registry;

/// Configuration contract of a unit.
pub trait UnitConfig: fmt::Debug + Send + Sync {
    /// Append a human-readable message to `errors` for every problem found.
    fn validate(&self, registry: &Registry, errors: &mut Vec<String>);

    /// Backend that tables produced by this unit are stored in.
    fn default_backend_name(&self) -> Option<&str>;

    /// Prefix prepended (with `_`) to every artifact name of this unit.
    fn table_name_prefix(&self) -> Option<&str> {
        None
    }

    /// Whether the artifact of `kind` named `name` (before prefixing)
    /// should be produced at all.
    fn is_artifact_enabled(&self, _kind: ArtifactKind, _name: &str) -> bool {
        true
    }

    /// Adjust a produced table after prefixing.
    ///
    /// Tables without a backend are assigned the default backend.
    fn customize_table(&self, table: &mut TableDef) {
        if table.backend_name.is_none() {
            table.backend_name = self.default_backend_name().map(str::to_string);
        }
    }
}

/// Selects artifacts by name, optionally restricted to one kind
/// (`"city"` or `"table:city"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSelector {
    pub kind: Option<ArtifactKind>,
    pub name: String,
}

impl ArtifactSelector {
    pub fn matches(&self, kind: ArtifactKind, name: &str) -> bool {
        self.name == name && self.kind.is_none_or(|k| k == kind)
    }
}

impl FromStr for ArtifactSelector {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidSelector {
            value: s.to_string(),
            reason: reason.to_string(),
        };
        let (kind, name) = match s.split_once(':') {
            Some((kind, name)) => (Some(kind.parse::<ArtifactKind>()?), name),
            None => (None, s),
        };
        if name.is_empty() {
            return Err(invalid("artifact name must not be empty"));
        }
        Ok(Self {
            kind,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ArtifactSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "{}:{}", kind, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Settings shared by most units.
///
/// ```toml
/// backend_name = "rdbms"
/// table_prefix = "shipping"
/// disabled_artifacts = ["table:city", "city"]
/// disabled_sections = ["city"]
///
/// [features]
/// cities = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitSettings {
    #[serde(default)]
    pub backend_name: Option<String>,
    #[serde(default)]
    pub table_prefix: Option<String>,
    #[serde(default)]
    pub disabled_artifacts: Vec<String>,
    /// Schema template sections to leave out of generated documents.
    #[serde(default)]
    pub disabled_sections: Vec<String>,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
}

impl UnitSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend_name: impl Into<String>) -> Self {
        self.backend_name = Some(backend_name.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = Some(prefix.into());
        self
    }

    pub fn with_disabled(mut self, selector: impl Into<String>) -> Self {
        self.disabled_artifacts.push(selector.into());
        self
    }

    pub fn with_disabled_section(mut self, section: impl Into<String>) -> Self {
        self.disabled_sections.push(section.into());
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>, enabled: bool) -> Self {
        self.features.insert(feature.into(), enabled);
        self
    }

    /// Features are on unless explicitly switched off.
    pub fn is_feature_enabled(&self, feature: &str) -> bool {
        self.features.get(feature).copied().unwrap_or(true)
    }

    /// Disabled selectors that parse; invalid ones are reported by
    /// [`UnitConfig::validate`].
    pub fn disabled_selectors(&self) -> impl Iterator<Item = ArtifactSelector> + '_ {
        self.disabled_artifacts
            .iter()
            .filter_map(|s| s.parse::<ArtifactSelector>().ok())
    }
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && !prefix.ends_with('_')
}

impl UnitConfig for UnitSettings {
    fn validate(&self, registry: &Registry, errors: &mut Vec<String>) {
        if let Some(prefix) = &self.table_prefix
            && !is_valid_prefix(prefix)
        {
            errors.push(format!(
                "table_prefix '{}' must start with a lowercase letter, contain only [a-z0-9_] and not end with '_'",
                prefix
            ));
        }

        match &self.backend_name {
            Some(backend) if backend.trim().is_empty() => {
                errors.push("backend_name must not be blank".to_string());
            }
            Some(backend) if registry.has_backends() && !registry.has_backend(backend) => {
                errors.push(format!(
                    "backend_name '{}' is not a backend known to the application",
                    backend
                ));
            }
            _ => {}
        }

        for selector in &self.disabled_artifacts {
            if let Err(e) = selector.parse::<ArtifactSelector>() {
                errors.push(format!("disabled_artifacts: {}", e));
            }
        }

        for section in &self.disabled_sections {
            if section.trim().is_empty() {
                errors.push("disabled_sections: section name must not be blank".to_string());
            }
        }
    }

    fn default_backend_name(&self) -> Option<&str> {
        self.backend_name.as_deref()
    }

    fn table_name_prefix(&self) -> Option<&str> {
        self.table_prefix.as_deref()
    }

    fn is_artifact_enabled(&self, kind: ArtifactKind, name: &str) -> bool {
        !self.disabled_selectors().any(|s| s.matches(kind, name))
    }
}

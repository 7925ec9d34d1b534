//! Application manifest (`units.toml`)
//!
//! Lists the storage backends an application offers and the unit instances
//! to compose into its registry:
//!
//! ```toml
//! [app]
//! name = "shop"
//! backends = ["rdbms"]
//!
//! [[units]]
//! group = "io.units"
//! artifact = "geo"
//! version = "^1.0"
//! namespace = "shipping"
//!
//! [units.settings]
//! backend_name = "rdbms"
//! table_prefix = "shipping"
//! ```
//!
//! `version` is a semver requirement matched against the catalog's units.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use unit_fs::{ConfigStore, NormalizedPath};
use unit_meta::{Registry, UnitId, UnitSettings};

use crate::{Error, Result};

/// `[app]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    pub name: String,
    #[serde(default)]
    pub backends: Vec<String>,
    /// Author recorded in generated changelogs.
    #[serde(default)]
    pub author: Option<String>,
}

/// One `[[units]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitEntry {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub settings: UnitSettings,
}

impl UnitEntry {
    pub fn requirement(&self) -> std::result::Result<semver::VersionReq, semver::Error> {
        semver::VersionReq::parse(&self.version)
    }

    /// Whether `id` satisfies this entry's coordinates and version requirement.
    pub fn accepts(&self, id: &UnitId) -> bool {
        if id.group != self.group || id.artifact != self.artifact {
            return false;
        }
        match (self.requirement(), semver::Version::parse(&id.version)) {
            (Ok(req), Ok(version)) => req.matches(&version),
            _ => false,
        }
    }

    /// `group:artifact[@namespace]`
    pub fn label(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}@{}", self.group, self.artifact, ns),
            None => format!("{}:{}", self.group, self.artifact),
        }
    }
}

/// Parsed `units.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppManifest {
    pub app: AppSection,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
}

impl AppManifest {
    /// Parse TOML content. Structural problems are reported by
    /// [`AppManifest::validate`].
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Manifest {
            path: "<inline>".to_string(),
            errors: vec![e.to_string()],
        })
    }

    /// Load a TOML, JSON or YAML manifest and validate it.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let manifest: AppManifest = ConfigStore::new().load(path)?;
        let errors = manifest.validate();
        if !errors.is_empty() {
            return Err(Error::Manifest {
                path: path.to_string(),
                errors,
            });
        }
        tracing::debug!(path = %path, units = manifest.units.len(), "Loaded application manifest");
        Ok(manifest)
    }

    /// Every problem found, in manifest order.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.app.name.trim().is_empty() {
            errors.push("app.name must not be blank".to_string());
        }

        let mut backends = BTreeSet::new();
        for backend in &self.app.backends {
            if !backends.insert(backend.as_str()) {
                errors.push(format!("app.backends lists '{}' twice", backend));
            }
        }

        let mut seen = BTreeSet::new();
        for (i, entry) in self.units.iter().enumerate() {
            if let Err(e) = entry.requirement() {
                errors.push(format!(
                    "units[{}] ({}): version '{}' is not a semver requirement: {}",
                    i,
                    entry.label(),
                    entry.version,
                    e
                ));
            }
            if !seen.insert(entry.label()) {
                errors.push(format!("units[{}]: {} is listed twice", i, entry.label()));
            }
        }
        errors
    }

    /// Empty registry knowing the application's backends.
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new();
        for backend in &self.app.backends {
            registry.add_backend(backend.clone());
        }
        registry
    }
}

//! Unit identity and provenance

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maven-style coordinates of a unit: `group:artifact:version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl UnitId {
    /// Build and validate an identity.
    ///
    /// Group segments are dot-separated identifiers, the artifact is a
    /// kebab/snake identifier and the version must be valid semver.
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let id = Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        };
        id.validate()?;
        Ok(id)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidIdentity {
            value: self.to_string(),
            reason: reason.to_string(),
        };

        if self.group.is_empty() || !self.group.split('.').all(is_identifier) {
            return Err(invalid(
                "group must be dot-separated segments of alphanumerics, '-' or '_'",
            ));
        }
        if !is_identifier(&self.artifact) {
            return Err(invalid(
                "artifact must contain only alphanumerics, '-' or '_'",
            ));
        }
        semver::Version::parse(&self.version).map_err(|e| Error::InvalidIdentity {
            value: self.to_string(),
            reason: format!("version is not semver: {}", e),
        })?;
        Ok(())
    }

    /// Registration key for this unit deployed under `namespace`.
    pub fn key(&self, namespace: Option<&str>) -> UnitKey {
        UnitKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            namespace: namespace.map(str::to_string),
        }
    }
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for UnitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version),
            _ => Err(Error::InvalidIdentity {
                value: s.to_string(),
                reason: "expected group:artifact:version".to_string(),
            }),
        }
    }
}

/// Key under which a deployed unit instance is registered.
///
/// The version is not part of the key: two versions of one unit cannot be
/// deployed into the same namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitKey {
    pub group: String,
    pub artifact: String,
    pub namespace: Option<String>,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(namespace) = &self.namespace {
            write!(f, "@{}", namespace)?;
        }
        Ok(())
    }
}

/// Identity of the unit instance that produced an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub unit: UnitId,
    pub namespace: Option<String>,
}

impl Provenance {
    pub fn key(&self) -> UnitKey {
        self.unit.key(self.namespace.as_deref())
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit)?;
        if let Some(namespace) = &self.namespace {
            write!(f, "@{}", namespace)?;
        }
        Ok(())
    }
}

//! Artifacts produced by units

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::identity::Provenance;

/// Variant of a produced artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Table,
    Process,
    LookupSource,
    Widget,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Table,
        ArtifactKind::Process,
        ArtifactKind::LookupSource,
        ArtifactKind::Widget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Table => "table",
            ArtifactKind::Process => "process",
            ArtifactKind::LookupSource => "lookup-source",
            ArtifactKind::Widget => "widget",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ArtifactKind::Table),
            "process" => Ok(ArtifactKind::Process),
            "lookup-source" | "lookup_source" | "lookup" => Ok(ArtifactKind::LookupSource),
            "widget" => Ok(ArtifactKind::Widget),
            _ => Err(Error::UnknownKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Storage type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    String,
    Decimal,
    Boolean,
    DateTime,
}

/// A single field of a table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub label: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            max_length: None,
            label: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Definition of a stored table.
///
/// `natural_key` lists the fields whose values identify a row independently
/// of its surrogate `primary_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub backend_name: Option<String>,
    pub primary_key: String,
    #[serde(default)]
    pub natural_key: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            backend_name: None,
            primary_key: "id".to_string(),
            natural_key: Vec::new(),
            fields: vec![FieldDef::new("id", FieldType::Integer)],
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_backend(mut self, backend_name: impl Into<String>) -> Self {
        self.backend_name = Some(backend_name.into());
        self
    }

    pub fn with_natural_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.natural_key = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Definition of a runnable process, optionally bound to a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
}

/// A lookup source offering the rows of a table as selectable values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSourceDef {
    pub name: String,
    pub table: String,
    pub value_field: String,
    pub label_field: String,
}

/// A dashboard widget, optionally launching a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetDef {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub process: Option<String>,
}

/// An artifact returned by a producer, before provenance is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Artifact {
    Table(TableDef),
    Process(ProcessDef),
    LookupSource(LookupSourceDef),
    Widget(WidgetDef),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Table(_) => ArtifactKind::Table,
            Artifact::Process(_) => ArtifactKind::Process,
            Artifact::LookupSource(_) => ArtifactKind::LookupSource,
            Artifact::Widget(_) => ArtifactKind::Widget,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Artifact::Table(t) => &t.name,
            Artifact::Process(p) => &p.name,
            Artifact::LookupSource(l) => &l.name,
            Artifact::Widget(w) => &w.name,
        }
    }

    pub fn set_name(&mut self, name: String) {
        match self {
            Artifact::Table(t) => t.name = name,
            Artifact::Process(p) => p.name = name,
            Artifact::LookupSource(l) => l.name = name,
            Artifact::Widget(w) => w.name = name,
        }
    }

    /// Names of the tables this artifact refers to.
    pub fn table_refs(&self) -> Vec<&str> {
        match self {
            Artifact::Process(ProcessDef {
                table: Some(table), ..
            }) => vec![table.as_str()],
            Artifact::LookupSource(l) => vec![l.table.as_str()],
            _ => Vec::new(),
        }
    }

    /// Process launched by this artifact, if any.
    pub fn process_ref(&self) -> Option<&str> {
        match self {
            Artifact::Widget(WidgetDef {
                process: Some(process),
                ..
            }) => Some(process),
            _ => None,
        }
    }

    /// Rewrite every reference to another artifact through `rename`, which
    /// receives the referenced kind and name.
    pub fn rewrite_refs(&mut self, mut rename: impl FnMut(ArtifactKind, &str) -> Option<String>) {
        let (kind, target) = match self {
            Artifact::Process(ProcessDef {
                table: Some(table), ..
            }) => (ArtifactKind::Table, table),
            Artifact::LookupSource(l) => (ArtifactKind::Table, &mut l.table),
            Artifact::Widget(WidgetDef {
                process: Some(process),
                ..
            }) => (ArtifactKind::Process, process),
            _ => return,
        };
        if let Some(renamed) = rename(kind, target) {
            *target = renamed;
        }
    }

    pub fn as_table(&self) -> Option<&TableDef> {
        match self {
            Artifact::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableDef> {
        match self {
            Artifact::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<TableDef> for Artifact {
    fn from(def: TableDef) -> Self {
        Artifact::Table(def)
    }
}

impl From<ProcessDef> for Artifact {
    fn from(def: ProcessDef) -> Self {
        Artifact::Process(def)
    }
}

impl From<LookupSourceDef> for Artifact {
    fn from(def: LookupSourceDef) -> Self {
        Artifact::LookupSource(def)
    }
}

impl From<WidgetDef> for Artifact {
    fn from(def: WidgetDef) -> Self {
        Artifact::Widget(def)
    }
}

/// An artifact frozen into the registry together with the unit that made it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducedArtifact {
    pub artifact: Artifact,
    pub provenance: Provenance,
}

impl ProducedArtifact {
    pub fn new(artifact: Artifact, provenance: Provenance) -> Self {
        Self {
            artifact,
            provenance,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.artifact.kind()
    }

    pub fn name(&self) -> &str {
        self.artifact.name()
    }
}

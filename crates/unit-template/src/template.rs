//! Parsed schema templates

use std::collections::BTreeSet;

use unit_fs::NormalizedPath;

use crate::error::Result;
use crate::parser::{self, Parsed, Piece, Section};
use crate::render::{self, Parameters};

/// An immutable, validated schema template.
///
/// Parsing checks section structure and token syntax up front, so a
/// constructed template can only fail to render for unbound tokens or
/// unknown disabled sections.
#[derive(Debug, Clone)]
pub struct SchemaTemplate {
    name: String,
    source: String,
    pieces: Vec<Piece>,
    sections: Vec<Section>,
}

impl SchemaTemplate {
    /// Parse template text. `name` is used in log output only.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let source = source.into();
        let Parsed { pieces, sections } = parser::parse(&source)?;
        tracing::debug!(
            template = %name,
            sections = sections.len(),
            "Parsed schema template"
        );
        Ok(Self {
            name,
            source,
            pieces,
            sections,
        })
    }

    /// Load and parse a template file.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let source = unit_fs::io::read_text(path)?;
        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        Self::parse(name, source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sections in document order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn find_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.find_section(name).is_some()
    }

    /// Distinct token names referenced anywhere in the template.
    pub fn tokens(&self) -> BTreeSet<&str> {
        self.pieces
            .iter()
            .filter_map(|p| match p {
                Piece::Token { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Shorthand for [`render::render`].
    pub fn render(&self, parameters: &Parameters, disabled: &BTreeSet<String>) -> Result<String> {
        render::render(self, parameters, disabled)
    }

    pub(crate) fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

//! Template rendering

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::parser::Piece;
use crate::template::SchemaTemplate;

/// Token bindings, name to replacement text.
pub type Parameters = BTreeMap<String, String>;

/// Render `template` with `parameters`, removing every section named in
/// `disabled` together with its markers.
///
/// Tokens inside removed sections need no binding. Output depends only on
/// the arguments.
///
/// # Errors
///
/// - [`Error::UnknownSection`] if `disabled` names a section the template
///   does not declare.
/// - [`Error::UnboundToken`] for the first kept token without a binding.
pub fn render(
    template: &SchemaTemplate,
    parameters: &Parameters,
    disabled: &BTreeSet<String>,
) -> Result<String> {
    if let Some(unknown) = disabled.iter().find(|name| !template.has_section(name)) {
        return Err(Error::UnknownSection {
            name: unknown.clone(),
        });
    }

    let source = template.source();
    let sections = template.sections();
    let mut out = String::with_capacity(source.len());
    // Number of open sections at or below the outermost disabled one.
    let mut skip = 0usize;

    for piece in template.pieces() {
        match piece {
            Piece::Start(idx) => {
                if skip > 0 || disabled.contains(&sections[*idx].name) {
                    skip += 1;
                }
            }
            Piece::End(_) => {
                skip = skip.saturating_sub(1);
            }
            _ if skip > 0 => {}
            Piece::Text(range) => out.push_str(&source[range.clone()]),
            Piece::Escape => out.push_str("${"),
            Piece::Token { name, line } => match parameters.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(Error::UnboundToken {
                        name: name.clone(),
                        line: *line,
                    });
                }
            },
        }
    }

    tracing::debug!(
        template = template.name(),
        disabled = disabled.len(),
        bytes = out.len(),
        "Rendered schema template"
    );
    Ok(out)
}

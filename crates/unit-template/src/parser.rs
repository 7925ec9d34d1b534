//! Template markup parsing.
//!
//! Splits a template into a flat list of [`Piece`]s (literal text, tokens,
//! escapes and section markers) and validates section structure with a
//! marker stack.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// `<!-- section:NAME -->` or `<!-- /section:NAME -->`
static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*(/?)section:([A-Za-z0-9_.-]+)\s*-->").expect("Invalid marker regex")
});

/// Escape, well-formed token, or a dangling `${`
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$\{|\$\{([^}\n]*)\}|\$\{").expect("Invalid token regex")
});

static TOKEN_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid token name regex"));

/// A named section of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// 1-based line of the start marker.
    pub start_line: usize,
    /// 1-based line of the end marker.
    pub end_line: usize,
    /// Nesting depth, 0 for top-level sections.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    Text(Range<usize>),
    Token { name: String, line: usize },
    /// `$${`, emitted as `${`
    Escape,
    Start(usize),
    End(usize),
}

#[derive(Debug)]
pub(crate) struct Parsed {
    pub pieces: Vec<Piece>,
    pub sections: Vec<Section>,
}

struct Special {
    range: Range<usize>,
    piece: Piece,
}

/// Byte offsets of line starts, for offset -> line lookups.
struct Lines {
    starts: Vec<usize>,
}

impl Lines {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

/// Widen a marker match to its whole line when nothing but whitespace shares
/// the line, so removing the marker does not leave a blank line behind.
fn marker_span(text: &str, found: Range<usize>) -> Range<usize> {
    let line_start = text[..found.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[found.end..]
        .find('\n')
        .map_or(text.len(), |i| found.end + i + 1);

    let before = &text[line_start..found.start];
    let after = &text[found.end..line_end];
    if before.trim().is_empty() && after.trim().is_empty() {
        line_start..line_end
    } else {
        found
    }
}

pub(crate) fn parse(text: &str) -> Result<Parsed> {
    let lines = Lines::new(text);
    let mut specials = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut open: Vec<usize> = Vec::new();

    for caps in MARKER_REGEX.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        let closing = !caps[1].is_empty();
        let name = caps[2].to_string();
        let line = lines.line_of(whole.start());
        let range = marker_span(text, whole.range());

        if closing {
            let Some(&top) = open.last() else {
                return Err(Error::UnmatchedEnd { name, line });
            };
            if sections[top].name != name {
                return Err(Error::MisnestedSection {
                    expected: sections[top].name.clone(),
                    found: name,
                    line,
                });
            }
            open.pop();
            sections[top].end_line = line;
            specials.push(Special {
                range,
                piece: Piece::End(top),
            });
        } else {
            if let Some(&first) = by_name.get(&name) {
                return Err(Error::DuplicateSection {
                    name,
                    line,
                    first_line: sections[first].start_line,
                });
            }
            let idx = sections.len();
            by_name.insert(name.clone(), idx);
            sections.push(Section {
                name,
                start_line: line,
                end_line: line,
                depth: open.len(),
            });
            open.push(idx);
            specials.push(Special {
                range,
                piece: Piece::Start(idx),
            });
        }
    }

    if let Some(&idx) = open.last() {
        return Err(Error::UnclosedSection {
            name: sections[idx].name.clone(),
            line: sections[idx].start_line,
        });
    }

    for caps in TOKEN_REGEX.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        let line = lines.line_of(whole.start());
        let piece = match (whole.as_str(), caps.get(1)) {
            ("$${", _) => Piece::Escape,
            (_, Some(name)) => {
                if !TOKEN_NAME_REGEX.is_match(name.as_str()) {
                    return Err(Error::InvalidToken {
                        token: whole.as_str().to_string(),
                        line,
                    });
                }
                Piece::Token {
                    name: name.as_str().to_string(),
                    line,
                }
            }
            _ => return Err(Error::UnterminatedToken { line }),
        };
        specials.push(Special {
            range: whole.range(),
            piece,
        });
    }

    specials.sort_by_key(|s| s.range.start);

    let mut pieces = Vec::with_capacity(specials.len() * 2 + 1);
    let mut cursor = 0;
    for special in specials {
        if special.range.start > cursor {
            pieces.push(Piece::Text(cursor..special.range.start));
        }
        cursor = special.range.end;
        pieces.push(special.piece);
    }
    if cursor < text.len() {
        pieces.push(Piece::Text(cursor..text.len()));
    }

    Ok(Parsed { pieces, sections })
}

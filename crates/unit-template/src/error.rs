//! Error types for unit-template

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] unit_fs::Error),

    #[error("Unbound token '${{{name}}}' at line {line}")]
    UnboundToken { name: String, line: usize },

    #[error("Invalid token '{token}' at line {line}: names may contain only [A-Za-z0-9_.-]")]
    InvalidToken { token: String, line: usize },

    #[error("Unterminated token at line {line}")]
    UnterminatedToken { line: usize },

    #[error("End marker for section '{name}' at line {line} has no matching start marker")]
    UnmatchedEnd { name: String, line: usize },

    #[error("Section '{found}' closed at line {line} while section '{expected}' is still open")]
    MisnestedSection {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("Section '{name}' opened at line {line} is never closed")]
    UnclosedSection { name: String, line: usize },

    #[error("Section '{name}' at line {line} was already declared at line {first_line}")]
    DuplicateSection {
        name: String,
        line: usize,
        first_line: usize,
    },

    #[error("Cannot disable unknown section '{name}'")]
    UnknownSection { name: String },
}

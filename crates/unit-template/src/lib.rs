//! Schema template rendering for the unit registry.
//!
//! A schema template is a text document with two kinds of markup:
//!
//! ```text
//! <!-- section:city -->
//! <createTable tableName="${table_prefix}city"/>
//! <!-- /section:city -->
//! ```
//!
//! - **Sections** are delimited by paired `<!-- section:NAME -->` /
//!   `<!-- /section:NAME -->` markers. They may nest but must not overlap.
//!   A disabled section is removed together with its markers; an enabled
//!   section keeps its body and loses only the marker lines.
//! - **Tokens** are written `${name}` and replaced by bound parameter values.
//!   `$${` produces a literal `${`.
//!
//! Markup is validated when the template is parsed, so structural errors are
//! reported before any output is produced. Rendering is a pure function of
//! (template, parameters, disabled sections).

pub mod error;
pub mod parser;
pub mod render;
pub mod template;

pub use error::{Error, Result};
pub use parser::Section;
pub use render::{Parameters, render};
pub use template::SchemaTemplate;

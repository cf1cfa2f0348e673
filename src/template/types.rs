//! Template error definitions

use std::fmt;

use thiserror::Error;

/// Which of the two configured templates an error or reload refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKey {
    Room,
    Message,
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Room => f.write_str("room"),
            TemplateKey::Message => f.write_str("message"),
        }
    }
}

/// Malformed template source, rejected at compile time.
///
/// `column` is the byte offset of the offending placeholder in the source,
/// so the same source always produces the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (column {column})")]
pub struct TemplateSyntaxError {
    pub message: String,
    pub column: usize,
}

/// A placeholder referenced a variable absent from the namespace at render
/// time. Distinct from [`TemplateSyntaxError`]: the template itself is fine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("undefined variable: {path}")]
pub struct UndefinedVariableError {
    /// Full dotted path as written in the template, e.g. `json.text`.
    pub path: String,
}

//! Compilation and rendering of `{{ variable }}` templates.
//!
//! A template is compiled once into literal and placeholder segments;
//! rendering resolves each placeholder's dotted path against the per-request
//! variable namespace. Syntax problems surface deterministically at compile
//! time, never on first render.

use serde_json::Value;

use crate::extract::VariableNamespace;

use super::types::{TemplateSyntaxError, UndefinedVariableError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// Dotted variable path, e.g. `["json", "text"]` for `{{json.text}}`.
    Placeholder(Vec<String>),
}

/// An immutable, render-ready template.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    /// Parse `source`, rejecting malformed placeholder syntax immediately.
    ///
    /// `{{` opens a placeholder and must be matched by `}}`; the expression
    /// between them must be a non-empty dotted path of identifier segments.
    /// A `}}` with no opening `{{` is plain text.
    pub fn compile(source: &str) -> Result<Self, TemplateSyntaxError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| TemplateSyntaxError {
                message: "unclosed placeholder".to_string(),
                column: offset + open,
            })?;
            let path = parse_path(after_open[..close].trim()).ok_or_else(|| TemplateSyntaxError {
                message: format!(
                    "invalid placeholder expression '{}'",
                    after_open[..close].trim()
                ),
                column: offset + open,
            })?;
            segments.push(Segment::Placeholder(path));
            offset += open + 2 + close + 2;
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Resolve every placeholder against `vars`, failing on the first
    /// variable absent from the namespace.
    pub fn render(&self, vars: &VariableNamespace) -> Result<String, UndefinedVariableError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(path) => {
                    let value = vars.lookup(path).ok_or_else(|| UndefinedVariableError {
                        path: path.join("."),
                    })?;
                    out.push_str(&format_value(value));
                }
            }
        }
        Ok(out)
    }

    /// The source string this template was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn parse_path(expression: &str) -> Option<Vec<String>> {
    if expression.is_empty() {
        return None;
    }
    let mut path = Vec::new();
    for segment in expression.split('.') {
        if segment.is_empty()
            || !segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return None;
        }
        path.push(segment.to_string());
    }
    Some(path)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Arrays and objects render as their JSON representation
        other => other.to_string(),
    }
}

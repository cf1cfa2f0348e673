//! Template engine: compile-once `{{ variable }}` templates and the
//! concurrent slot that lets a reload swap a recompiled template while
//! requests keep rendering.

mod compiled;
mod slot;
mod types;

pub use compiled::CompiledTemplate;
pub use slot::TemplateSlot;
pub use types::{TemplateKey, TemplateSyntaxError, UndefinedVariableError};

//! Concurrent compiled-template slot.
//!
//! Every request path reads the slot; the reload path is the only writer.
//! The swap is a pointer swap of an `Arc`, so a reader either sees the old
//! compiled template or the new one, never a partially built object.

use std::sync::{Arc, RwLock};

use super::compiled::CompiledTemplate;
use super::types::{TemplateKey, TemplateSyntaxError};

pub struct TemplateSlot {
    key: TemplateKey,
    current: RwLock<Arc<CompiledTemplate>>,
}

impl TemplateSlot {
    /// Compile `source` into a fresh slot. Fails on malformed syntax, in
    /// which case no slot exists and the service must not start.
    pub fn compile(key: TemplateKey, source: &str) -> Result<Self, TemplateSyntaxError> {
        let compiled = CompiledTemplate::compile(source)?;
        Ok(Self {
            key,
            current: RwLock::new(Arc::new(compiled)),
        })
    }

    /// Snapshot of the compiled template currently in service.
    pub fn current(&self) -> Arc<CompiledTemplate> {
        self.current
            .read()
            .expect("template slot lock poisoned")
            .clone()
    }

    /// Recompile from new source and swap it in. On a syntax error the
    /// previous compiled template stays in service and the error is returned
    /// for reporting.
    pub fn reload(&self, source: &str) -> Result<(), TemplateSyntaxError> {
        match CompiledTemplate::compile(source) {
            Ok(compiled) => {
                *self.current.write().expect("template slot lock poisoned") = Arc::new(compiled);
                tracing::info!(template = %self.key, "Successfully reloaded {} template", self.key);
                Ok(())
            }
            Err(error) => {
                tracing::error!(
                    template = %self.key,
                    error = %error,
                    "Error in {} template, keeping previously loaded template",
                    self.key
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::VariableNamespace;
    use serde_json::json;

    #[test]
    fn test_compile_rejects_bad_source() {
        assert!(TemplateSlot::compile(TemplateKey::Room, "{{broken").is_err());
    }

    #[test]
    fn test_reload_swaps_template() {
        let slot = TemplateSlot::compile(TemplateKey::Message, "old {{body}}").unwrap();
        slot.reload("new {{body}}").unwrap();

        let vars = VariableNamespace::from_value(json!({"body": "text"}));
        assert_eq!(slot.current().render(&vars).unwrap(), "new text");
    }

    #[test]
    fn test_failed_reload_keeps_previous_template() {
        let slot = TemplateSlot::compile(TemplateKey::Message, "old {{body}}").unwrap();
        assert!(slot.reload("{{broken").is_err());

        let vars = VariableNamespace::from_value(json!({"body": "text"}));
        assert_eq!(slot.current().render(&vars).unwrap(), "old text");
        assert_eq!(slot.current().source(), "old {{body}}");
    }

    #[test]
    fn test_snapshot_survives_later_swap() {
        let slot = TemplateSlot::compile(TemplateKey::Room, "first").unwrap();
        let snapshot = slot.current();
        slot.reload("second").unwrap();

        let vars = VariableNamespace::from_value(json!({}));
        assert_eq!(snapshot.render(&vars).unwrap(), "first");
        assert_eq!(slot.current().render(&vars).unwrap(), "second");
    }
}

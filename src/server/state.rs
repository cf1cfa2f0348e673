use std::sync::{Arc, RwLock};

use crate::chat::ChatClient;
use crate::config::HookConfig;
use crate::error::AppError;
use crate::extract::VariableNamespace;
use crate::reload::{reconcile, ReloadActions};
use crate::template::{TemplateKey, TemplateSlot};

/// Everything the request path shares: the live configuration snapshot, the
/// two compiled-template slots and the chat client. Safe to call from any
/// number of concurrent request tasks; reload is the only writer.
pub struct WebhookService {
    config: RwLock<Arc<HookConfig>>,
    room_template: TemplateSlot,
    message_template: TemplateSlot,
    chat: Arc<dyn ChatClient>,
}

impl WebhookService {
    /// Compile both templates and take the initial configuration. A template
    /// that fails to compile here is fatal: the webhook must not start.
    pub fn new(config: HookConfig, chat: Arc<dyn ChatClient>) -> Result<Self, AppError> {
        let room_template = TemplateSlot::compile(TemplateKey::Room, &config.room_template)
            .map_err(|source| AppError::Template {
                key: TemplateKey::Room,
                source,
            })?;
        let message_template =
            TemplateSlot::compile(TemplateKey::Message, &config.message_template).map_err(
                |source| AppError::Template {
                    key: TemplateKey::Message,
                    source,
                },
            )?;

        Ok(Self {
            config: RwLock::new(Arc::new(config)),
            room_template,
            message_template,
            chat,
        })
    }

    /// Snapshot of the configuration currently in effect.
    pub fn config(&self) -> Arc<HookConfig> {
        self.config
            .read()
            .expect("config lock poisoned")
            .clone()
    }

    pub fn chat(&self) -> &dyn ChatClient {
        self.chat.as_ref()
    }

    /// Render one of the configured templates against a request's namespace.
    pub fn render(
        &self,
        key: TemplateKey,
        vars: &VariableNamespace,
    ) -> Result<String, AppError> {
        let slot = match key {
            TemplateKey::Room => &self.room_template,
            TemplateKey::Message => &self.message_template,
        };
        slot.current()
            .render(vars)
            .map_err(|e| AppError::Render {
                key,
                variable: e.path,
            })
    }

    /// Apply a new validated configuration.
    ///
    /// Changed templates are recompiled through their slots; a syntax error
    /// is logged there and the previous compiled template stays in service.
    /// A path or method change is reported back so the host can re-register
    /// the route. Re-applying an unchanged configuration does nothing.
    pub fn reload(&self, new: HookConfig) -> ReloadActions {
        let old = self.config();
        let actions = reconcile(&old, &new);

        if actions.room_template_changed {
            tracing::debug!("Room changed, reloading template...");
            let _ = self.room_template.reload(&new.room_template);
        }
        if actions.message_template_changed {
            tracing::debug!("Message changed, reloading template...");
            let _ = self.message_template.reload(&new.message_template);
        }
        if actions.route_changed {
            tracing::debug!("Path or method changed, restarting webhook...");
        }

        *self.config.write().expect("config lock poisoned") = Arc::new(new);
        actions
    }
}

/// Axum state handed to the webhook handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WebhookService>,
}

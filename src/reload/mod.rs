//! Configuration reload reconciliation.
//!
//! A reload never mutates state in place: the old and new configurations are
//! diffed into discrete actions, so an unchanged field causes no work and
//! re-applying an identical configuration is a no-op.

use crate::config::HookConfig;

/// Discrete actions produced by comparing an old and new configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadActions {
    /// Path or method changed; the host must tear the registered route down
    /// and re-register it.
    pub route_changed: bool,
    pub room_template_changed: bool,
    pub message_template_changed: bool,
}

impl ReloadActions {
    pub fn is_noop(&self) -> bool {
        !(self.route_changed || self.room_template_changed || self.message_template_changed)
    }
}

pub fn reconcile(old: &HookConfig, new: &HookConfig) -> ReloadActions {
    ReloadActions {
        route_changed: old.path != new.path || old.method != new.method,
        room_template_changed: old.room_template != new.room_template,
        message_template_changed: old.message_template != new.message_template,
    }
}

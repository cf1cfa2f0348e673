mod hook;
mod settings;

pub use hook::{HookConfig, MessageFormat, MessageType};
pub use settings::{ChatConfig, HookSettings, ServerConfig, Settings};

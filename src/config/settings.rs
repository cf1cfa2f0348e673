use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub hook: HookSettings,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Raw webhook endpoint settings as they appear in the configuration
/// sources. Validated into a `HookConfig` before use.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HookSettings {
    #[serde(default = "default_hook_path")]
    pub path: String,
    #[serde(default = "default_hook_method")]
    pub method: String,
    /// Room template source.
    pub room: String,
    /// Message template source.
    pub message: String,
    pub message_format: Option<String>,
    #[serde(default = "default_message_type")]
    pub message_type: String,
    pub auth_type: Option<String>,
    pub auth_token: Option<String>,
    /// Legacy switch that predates `message_format`.
    pub markdown: Option<bool>,
    #[serde(default)]
    pub force_json: bool,
    #[serde(default)]
    pub ignore_empty_messages: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    pub gateway_token: Option<String>,
    /// Outbound request timeout in seconds.
    #[serde(default = "default_chat_timeout")]
    pub timeout_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_hook_path() -> String {
    "/webhook".to_string()
}

fn default_hook_method() -> String {
    "POST".to_string()
}

fn default_message_type() -> String {
    "m.text".to_string()
}

fn default_gateway_url() -> String {
    "http://localhost:8008/send".to_string()
}

fn default_chat_timeout() -> u64 {
    10
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("hook.path", "/webhook")?
            .set_default("hook.method", "POST")?
            .set_default("hook.message_type", "m.text")?
            .set_default("chat.gateway_url", "http://localhost:8008/send")?
            .set_default("chat.timeout_seconds", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER__HOST, HOOK__AUTH_TOKEN, CHAT__GATEWAY_URL, etc.
            .add_source(Environment::default().separator("__").try_parsing(true));

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            gateway_token: None,
            timeout_seconds: default_chat_timeout(),
        }
    }
}

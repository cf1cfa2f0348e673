//! Validated webhook endpoint configuration.
//!
//! Raw settings are stringly typed; everything the request path dispatches
//! on is resolved here, once, at load time. Validation failures are fatal to
//! startup and abort a reload before it touches the running service.

use std::fmt;

use axum::http::Method;
use config::ConfigError;

use crate::auth::AuthCredentials;

use super::settings::HookSettings;

/// How the rendered message is delivered to the chat client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Markdown,
    PlainText,
    Html,
}

impl MessageFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "markdown" => Ok(Self::Markdown),
            "plaintext" => Ok(Self::PlainText),
            "html" => Ok(Self::Html),
            other => Err(ConfigError::Message(format!(
                "Invalid message_format '{other}' specified! Must be one of: markdown, \
                 plaintext, html"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::PlainText => "plaintext",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire message type forwarded to the chat client with every send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
    Notice,
}

impl MessageType {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "m.text" => Ok(Self::Text),
            "m.notice" => Ok(Self::Notice),
            other => Err(ConfigError::Message(format!(
                "Invalid message_type '{other}' specified! Must be one of: m.text, m.notice"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "m.text",
            Self::Notice => "m.notice",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fully validated webhook endpoint configuration, read-only to the
/// request path. Reload replaces the whole value atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct HookConfig {
    pub path: String,
    pub method: Method,
    pub room_template: String,
    pub message_template: String,
    pub message_format: MessageFormat,
    pub message_type: MessageType,
    pub auth: Option<AuthCredentials>,
    pub force_json: bool,
    pub ignore_empty_messages: bool,
}

impl HookConfig {
    pub fn from_settings(settings: &HookSettings) -> Result<Self, ConfigError> {
        if !settings.path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "Invalid path '{}' specified! It must start with '/'.",
                settings.path
            )));
        }

        // legacy boolean `markdown` option, honored when message_format is absent
        let message_format = match (settings.message_format.as_deref(), settings.markdown) {
            (Some(value), _) => MessageFormat::parse(value)?,
            (None, Some(true)) => MessageFormat::Markdown,
            (None, _) => MessageFormat::PlainText,
        };

        Ok(Self {
            path: settings.path.clone(),
            method: parse_method(&settings.method)?,
            room_template: settings.room.clone(),
            message_template: settings.message.clone(),
            message_format,
            message_type: MessageType::parse(&settings.message_type)?,
            auth: AuthCredentials::from_config(
                settings.auth_type.as_deref(),
                settings.auth_token.as_deref(),
            )?,
            force_json: settings.force_json,
            ignore_empty_messages: settings.ignore_empty_messages,
        })
    }
}

fn parse_method(value: &str) -> Result<Method, ConfigError> {
    match value.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        "PATCH" => Ok(Method::PATCH),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        "TRACE" => Ok(Method::TRACE),
        other => Err(ConfigError::Message(format!(
            "Invalid method '{other}' specified!"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> HookSettings {
        HookSettings {
            path: "/webhook".to_string(),
            method: "POST".to_string(),
            room: "!room:example.org".to_string(),
            message: "{{body}}".to_string(),
            message_format: None,
            message_type: "m.text".to_string(),
            auth_type: None,
            auth_token: None,
            markdown: None,
            force_json: false,
            ignore_empty_messages: false,
        }
    }

    #[test]
    fn test_defaults_resolve() {
        let config = HookConfig::from_settings(&base_settings()).unwrap();
        assert_eq!(config.method, Method::POST);
        assert_eq!(config.message_format, MessageFormat::PlainText);
        assert_eq!(config.message_type, MessageType::Text);
        assert_eq!(config.auth, None);
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let mut settings = base_settings();
        settings.method = "put".to_string();
        let config = HookConfig::from_settings(&settings).unwrap();
        assert_eq!(config.method, Method::PUT);
    }

    #[test]
    fn test_unknown_method_fails() {
        let mut settings = base_settings();
        settings.method = "FETCH".to_string();
        assert!(HookConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_path_must_start_with_slash() {
        let mut settings = base_settings();
        settings.path = "webhook".to_string();
        let err = HookConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("Invalid path"));
    }

    #[test]
    fn test_invalid_message_format_fails() {
        let mut settings = base_settings();
        settings.message_format = Some("rich-text".to_string());
        let err = HookConfig::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("Invalid message_format 'rich-text'"));
    }

    #[test]
    fn test_invalid_message_type_fails() {
        let mut settings = base_settings();
        settings.message_type = "m.emote".to_string();
        assert!(HookConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_legacy_markdown_flag() {
        let mut settings = base_settings();
        settings.markdown = Some(true);
        let config = HookConfig::from_settings(&settings).unwrap();
        assert_eq!(config.message_format, MessageFormat::Markdown);

        // an explicit message_format wins over the legacy flag
        settings.message_format = Some("html".to_string());
        let config = HookConfig::from_settings(&settings).unwrap();
        assert_eq!(config.message_format, MessageFormat::Html);
    }

    #[test]
    fn test_auth_pair_resolves() {
        let mut settings = base_settings();
        settings.auth_type = Some("basic".to_string());
        settings.auth_token = Some("user:pass".to_string());
        let config = HookConfig::from_settings(&settings).unwrap();
        assert_eq!(
            config.auth,
            Some(AuthCredentials::Basic {
                username: "user".to_string(),
                password: "pass".to_string()
            })
        );
    }

    #[test]
    fn test_auth_type_without_token_fails() {
        let mut settings = base_settings();
        settings.auth_type = Some("Bearer".to_string());
        assert!(HookConfig::from_settings(&settings).is_err());
    }
}

//! HTTP chat-gateway delivery channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{ChatConfig, MessageFormat, MessageType};

use super::{ChatClient, ChatError};

/// Delivers messages by POSTing JSON to a configured chat-gateway endpoint,
/// optionally authenticated with a bearer token.
pub struct GatewayChatClient {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    room: &'a str,
    message: &'a str,
    format: &'a str,
    msgtype: &'a str,
    timestamp: String,
}

impl GatewayChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            url: config.gateway_url.clone(),
            token: config.gateway_token.clone(),
        })
    }

    async fn post(
        &self,
        room: &str,
        message: &str,
        format: MessageFormat,
        message_type: MessageType,
    ) -> Result<(), ChatError> {
        let body = OutboundMessage {
            room,
            message,
            format: format.as_str(),
            msgtype: message_type.as_str(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let mut request = self
            .client
            .post(&self.url)
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string())
            .json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Gateway { status, body });
        }
        Ok(())
    }
}

#[async_trait]
impl ChatClient for GatewayChatClient {
    async fn send_markdown(
        &self,
        room: &str,
        text: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError> {
        self.post(room, text, MessageFormat::Markdown, message_type)
            .await
    }

    async fn send_text(
        &self,
        room: &str,
        text: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError> {
        self.post(room, text, MessageFormat::PlainText, message_type)
            .await
    }

    async fn send_html(
        &self,
        room: &str,
        html: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError> {
        self.post(room, html, MessageFormat::Html, message_type)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_message_shape() {
        let body = OutboundMessage {
            room: "!abc:example.org",
            message: "hello",
            format: MessageFormat::Html.as_str(),
            msgtype: MessageType::Notice.as_str(),
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["room"], "!abc:example.org");
        assert_eq!(value["message"], "hello");
        assert_eq!(value["format"], "html");
        assert_eq!(value["msgtype"], "m.notice");
    }
}

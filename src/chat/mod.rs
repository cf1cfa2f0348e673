//! Outbound chat delivery seam.
//!
//! The pipeline talks to a [`ChatClient`] trait object; the bundled
//! [`GatewayChatClient`] delivers over HTTP to a chat gateway. Delivery
//! errors are returned, never retried — webhook callers are expected to
//! retry on 500.

mod gateway;

pub use gateway::GatewayChatClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::MessageType;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("chat gateway returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },
}

/// A client able to post a message into a chat room.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_markdown(
        &self,
        room: &str,
        text: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError>;

    async fn send_text(
        &self,
        room: &str,
        text: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError>;

    async fn send_html(
        &self,
        room: &str,
        html: &str,
        message_type: MessageType,
    ) -> Result<(), ChatError>;
}

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::chat::ChatError;
use crate::template::{TemplateKey, TemplateSyntaxError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Template failed to compile. Fatal at startup; on reload the caller
    /// keeps the previously compiled template and only logs this.
    #[error("Error in {key} template: {source}")]
    Template {
        key: TemplateKey,
        source: TemplateSyntaxError,
    },

    /// Request rejected by the authenticator. `scheme` is advertised back in
    /// the `WWW-Authenticate` challenge header.
    #[error("{reason}")]
    Unauthorized { scheme: String, reason: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(String),

    /// A template referenced a variable absent from the request's namespace.
    #[error("Undefined variables in {key} template: {variable}")]
    Render { key: TemplateKey, variable: String },

    #[error("Failed to send message '{message}' to room {room}: {source}")]
    Delivery {
        room: String,
        message: String,
        source: ChatError,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::JsonParse(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Template { .. }
            | AppError::Render { .. }
            | AppError::Delivery { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        tracing::error!(
            status = %status.as_u16(),
            message = %message,
            "Webhook request failed"
        );

        if let AppError::Unauthorized { scheme, .. } = &self {
            return (
                status,
                [(header::WWW_AUTHENTICATE, scheme.clone())],
                message,
            )
                .into_response();
        }

        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

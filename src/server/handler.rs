//! The webhook request pipeline: authenticate, extract, render, deliver.
//!
//! Each request runs the stages in order and stops at the first failure;
//! every failure maps to one HTTP status via `AppError`. Nothing here
//! mutates shared state, so concurrent requests never affect each other.

use axum::{
    extract::{RawPathParams, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::auth::authenticate;
use crate::config::MessageFormat;
use crate::error::{AppError, Result};
use crate::extract::extract_variables;
use crate::template::TemplateKey;

use super::AppState;

pub async fn handle_webhook(
    State(state): State<AppState>,
    params: RawPathParams,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Response {
    match process(&state, &params, query.as_deref(), &headers, body).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn process(
    state: &AppState,
    params: &RawPathParams,
    query: Option<&str>,
    headers: &HeaderMap,
    body: String,
) -> Result<Response> {
    let service = &state.service;
    let config = service.config();
    tracing::debug!(path = %config.path, "Got request");

    authenticate(headers, config.auth.as_ref())?;

    let variables = extract_variables(params.iter(), query, headers, body, config.force_json)?;

    let room = service.render(TemplateKey::Room, &variables)?;
    let message = service.render(TemplateKey::Message, &variables)?;

    if config.ignore_empty_messages && message.is_empty() {
        tracing::info!(
            room = %room,
            "Request processed successfully, but the template generated an empty message; \
             not sending"
        );
        return Ok(StatusCode::OK.into_response());
    }

    tracing::info!(
        room = %room,
        msgtype = %config.message_type,
        "Sending message to room: {}",
        message
    );
    let delivery = match config.message_format {
        MessageFormat::Markdown => {
            service
                .chat()
                .send_markdown(&room, &message, config.message_type)
                .await
        }
        MessageFormat::Html => {
            service
                .chat()
                .send_html(&room, &message, config.message_type)
                .await
        }
        MessageFormat::PlainText => {
            service
                .chat()
                .send_text(&room, &message, config.message_type)
                .await
        }
    };
    delivery.map_err(|source| AppError::Delivery {
        room,
        message,
        source,
    })?;

    Ok(StatusCode::OK.into_response())
}

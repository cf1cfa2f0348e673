use axum::{
    routing::{on, MethodFilter},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::error::AppError;

use super::handler::handle_webhook;
use super::AppState;

/// Build the router for the currently configured path and method. Called at
/// startup and again whenever a reload reports a route change.
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.service.config();

    let filter = MethodFilter::try_from(config.method.clone()).map_err(|_| {
        AppError::Config(config::ConfigError::Message(format!(
            "Unsupported method '{}'",
            config.method
        )))
    })?;

    Ok(Router::new()
        .route(&config.path, on(filter, handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

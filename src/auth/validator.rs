//! `Authorization` header validation for the webhook endpoint.

use axum::http::{header, HeaderMap};
use base64::Engine;
use subtle::ConstantTimeEq;

use crate::error::AppError;

use super::credentials::{title_case, AuthCredentials};

/// Check an incoming request's credentials against the configured scheme and
/// secret. With no credentials configured every request passes.
///
/// Every rejection maps to HTTP 401 carrying the configured scheme in
/// `WWW-Authenticate`. Credential comparison is constant-time.
pub fn authenticate(
    headers: &HeaderMap,
    credentials: Option<&AuthCredentials>,
) -> Result<(), AppError> {
    let Some(credentials) = credentials else {
        return Ok(());
    };
    let scheme = credentials.scheme_name();
    let reject = |reason: String| AppError::Unauthorized {
        scheme: scheme.to_string(),
        reason,
    };

    let Some(header_value) = headers.get(header::AUTHORIZATION) else {
        return Err(reject("Missing authorization header".to_string()));
    };
    let header_str = header_value
        .to_str()
        .map_err(|_| reject("Invalid authorization header format".to_string()))?;
    let Some((given_scheme, credential)) = header_str.split_once(' ') else {
        return Err(reject("Invalid authorization header format".to_string()));
    };

    let given_scheme = title_case(given_scheme);
    if given_scheme != scheme {
        return Err(reject(format!(
            "Unsupported authorization type: {given_scheme}"
        )));
    }

    match credentials {
        AuthCredentials::Basic { username, password } => {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(credential.trim())
                .map_err(|e| reject(format!("Invalid authorization header format: {e}")))?;
            let decoded = String::from_utf8(decoded).map_err(|_| {
                reject(
                    "Invalid authorization header format: credentials are not valid UTF-8"
                        .to_string(),
                )
            })?;
            let Some((given_username, given_password)) = decoded.split_once(':') else {
                return Err(reject(
                    "Invalid authorization header format: missing credential separator"
                        .to_string(),
                ));
            };

            let username_ok = given_username.as_bytes().ct_eq(username.as_bytes());
            let password_ok = given_password.as_bytes().ct_eq(password.as_bytes());
            if !bool::from(username_ok & password_ok) {
                return Err(reject("Invalid username or password".to_string()));
            }
        }
        AuthCredentials::Bearer { token } => {
            if !bool::from(credential.as_bytes().ct_eq(token.as_bytes())) {
                return Err(reject("Invalid authorization token".to_string()));
            }
        }
    }

    tracing::debug!("Auth token is valid");
    Ok(())
}

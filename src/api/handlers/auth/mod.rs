//! Auth endpoints and the device-session guard middleware.
//!
//! Register, login, and refresh are public; everything mounted behind
//! [`require_device_session`] additionally needs an access token whose device
//! claim still matches the account's current device; a valid signature alone
//! is not enough.

pub mod login;
pub mod me;
pub mod refresh;
pub mod register;
pub(crate) mod types;

pub use login::login;
pub use me::me;
pub use refresh::refresh;
pub use register::register;

use axum::{
    Json,
    extract::{Extension, Request},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::api::PgAuthService;
use crate::session::{AuthError, GuardError, check_device_session, guard::MSG_STALE_DEVICE};

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 50;
const PASSWORD_MIN_LENGTH: usize = 8;
const PASSWORD_MAX_LENGTH: usize = 128;

/// Username rule: 3-50 chars of letters, digits, dot, underscore, hyphen.
pub(super) fn valid_username(username: &str) -> bool {
    if username.len() < USERNAME_MIN_LENGTH || username.len() > USERNAME_MAX_LENGTH {
        return false;
    }
    Regex::new(r"^[A-Za-z0-9._-]+$").is_ok_and(|regex| regex.is_match(username))
}

pub(super) fn valid_password(password: &str) -> bool {
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&password.len())
}

/// Map a policy-engine outcome to a transport response. Storage and signing
/// failures are logged and collapsed into a generic 500.
pub(super) fn error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::Conflict(message) => (StatusCode::CONFLICT, (*message).to_string()),
        AuthError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, (*message).to_string()),
        AuthError::Store(source) => {
            error!("storage failure in auth operation: {source}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        AuthError::Internal(source) => {
            error!("internal failure in auth operation: {source}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": message })),
    )
        .into_response()
}

/// Middleware for protected routes: decode the bearer token, re-check the
/// device claim against stored state (fresh read), and attach the principal.
pub async fn require_device_session(
    Extension(service): Extension<Arc<PgAuthService>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return unauthorized(MSG_STALE_DEVICE);
    };

    let claims = match service.issuer().decode(&token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(MSG_STALE_DEVICE),
    };

    match check_device_session(service.credentials().as_ref(), &claims).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(GuardError::Unauthorized(message)) => unauthorized(message),
        Err(GuardError::Store(source)) => {
            error!("storage failure in device-session guard: {source}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

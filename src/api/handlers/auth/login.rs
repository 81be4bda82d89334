use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{LoginRequest, SessionTokensResponse};
use super::{error_response, valid_password, valid_username};
use crate::api::PgAuthService;

#[utoipa::path(
    post,
    path = "/api/auth/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; tokens issued", body = SessionTokensResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    service: Extension<Arc<PgAuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    // Malformed input gets a 400 before any credential lookup happens, so the
    // validators leak nothing about stored accounts.
    if !valid_username(&request.username) || !valid_password(&request.password) {
        debug!("login rejected: malformed request");
        return (StatusCode::BAD_REQUEST, "Invalid credentials.".to_string()).into_response();
    }

    match service.login(&request.username, &request.password).await {
        Ok(tokens) => (StatusCode::OK, Json(SessionTokensResponse::from(tokens))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

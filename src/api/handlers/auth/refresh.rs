use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{RefreshRequest, SessionTokensResponse};
use super::error_response;
use crate::api::PgAuthService;

#[utoipa::path(
    post,
    path = "/api/auth/v1/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token; refresh token unchanged", body = SessionTokensResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Invalid, expired, or revoked refresh token, or no active device session")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn refresh(
    service: Extension<Arc<PgAuthService>>,
    payload: Option<Json<RefreshRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    if request.refresh_token.trim().is_empty() {
        debug!("refresh rejected: empty token");
        return (StatusCode::BAD_REQUEST, "Invalid refresh token".to_string()).into_response();
    }

    match service.refresh(&request.refresh_token).await {
        Ok(tokens) => (StatusCode::OK, Json(SessionTokensResponse::from(tokens))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

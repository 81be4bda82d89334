use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use super::types::MeResponse;
use crate::session::Principal;

#[utoipa::path(
    get,
    path = "/api/auth/v1/me",
    responses(
        (status = 200, description = "Authenticated identity", body = MeResponse),
        (status = 401, description = "Missing, invalid, or stale access token")
    ),
    security(("bearer_token" = [])),
    tag = "auth"
)]
// The device-session guard middleware has already validated the token and
// attached the principal; this handler only reflects it back.
pub async fn me(principal: Extension<Principal>) -> impl IntoResponse {
    (StatusCode::OK, Json(MeResponse::from(principal.0)))
}

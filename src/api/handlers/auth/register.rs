use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::RegisterRequest;
use super::{error_response, valid_password, valid_username};
use crate::api::PgAuthService;

#[utoipa::path(
    post,
    path = "/api/auth/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered"),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Username already taken")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    service: Extension<Arc<PgAuthService>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string());
    };

    if !valid_username(&request.username) {
        debug!("register rejected: invalid username");
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string());
    }

    if !valid_password(&request.password) {
        debug!("register rejected: invalid password");
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string());
    }

    match service.register(&request.username, &request.password).await {
        Ok(()) => (StatusCode::OK, "User registered successfully.".to_string()),
        Err(err) => error_response(&err),
    }
}

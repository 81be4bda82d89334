//! OpenAPI document for the auth API.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::handlers::auth::types::{
    LoginRequest, MeResponse, RefreshRequest, RegisterRequest, SessionTokensResponse,
};
use crate::api::handlers::health::Health;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "dispensa",
        description = "Credential and session management core for the shared-groceries household API"
    ),
    paths(
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::refresh::refresh,
        crate::api::handlers::auth::me::me,
        crate::api::handlers::health::health,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        SessionTokensResponse,
        MeResponse,
        Health,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, refresh, and session introspection"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for route in [
            "/api/auth/v1/register",
            "/api/auth/v1/login",
            "/api/auth/v1/refresh",
            "/api/auth/v1/me",
            "/health",
        ] {
            assert!(
                paths.iter().any(|path| path.as_str() == route),
                "missing route {route} in OpenAPI document"
            );
        }
    }
}

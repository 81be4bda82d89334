//! HTTP surface: router assembly, middleware stack, and the server loop.

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::session::{
    AuthService, PgCredentialRepository, PgRefreshTokenRepository, TokenConfig, TokenIssuer,
};

pub(crate) mod handlers;
mod openapi;

use handlers::{auth, health};

/// The policy engine wired to Postgres, as shared with every handler.
pub type PgAuthService = AuthService<PgCredentialRepository, PgRefreshTokenRepository>;

/// Assemble the full application router around a service and pool.
///
/// Split out from [`serve`] so tests can drive the router without binding a
/// socket.
pub fn router(service: Arc<PgAuthService>, pool: PgPool) -> Router {
    let protected = Router::new()
        .route("/api/auth/v1/me", get(auth::me))
        .layer(middleware::from_fn(auth::require_device_session));

    Router::new()
        .route("/api/auth/v1/register", post(auth::register))
        .route("/api/auth/v1/login", post(auth::login))
        .route("/api/auth/v1/refresh", post(auth::refresh))
        .route("/health", get(health::health))
        .merge(protected)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(service))
                .layer(Extension(pool)),
        )
}

/// Connect to Postgres, build the auth service, and serve until shutdown.
///
/// # Errors
/// Returns an error if the database is unreachable or the listener fails.
pub async fn serve(port: u16, dsn: String, token_config: TokenConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let credentials = Arc::new(PgCredentialRepository::new(pool.clone()));
    let refresh_tokens = Arc::new(PgRefreshTokenRepository::new(pool.clone()));
    let service = Arc::new(AuthService::new(
        credentials,
        refresh_tokens,
        TokenIssuer::new(token_config),
    ));

    let app = router(service, pool);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    // Serve until interrupted; a failed signal hook would otherwise spin.
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Gracefully shutdown");
    } else {
        std::future::pending::<()>().await;
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

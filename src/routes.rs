//! Router configuration for the two HTTP servers.
//!
//! # Management API server
//!
//! - `GET  /health` - Health check: database, click queue (public)
//! - `/api/*`       - REST API (API key required, CORS, 100 req / 15 min per IP)
//!
//! # Redirect server
//!
//! - `GET  /health` - Health check (public)
//! - `GET  /{code}` - Short link resolution (100 req / min per IP)
//!
//! Both servers trace every request and trim trailing slashes.

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, rate_limit, tracing};
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Management API routes with authentication and tracing, without rate
/// limiting or CORS.
pub fn api_router(state: AppState) -> Router {
    let api = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(tracing::layer())
}

/// Redirect routes with tracing, without rate limiting.
pub fn redirect_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer())
}

/// Builds the CORS layer; an empty list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {o}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(cors.allow_origin(origins))
}

/// Full management API application.
///
/// `behind_proxy` makes the rate limiter key on forwarding headers; enable
/// only behind a trusted reverse proxy.
pub fn api_app(
    state: AppState,
    allowed_origins: &[String],
    behind_proxy: bool,
) -> Result<NormalizePath<Router>> {
    let api = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::api_layer(behind_proxy)?)
        .layer(cors_layer(allowed_origins)?);

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}

/// Full redirect application.
pub fn redirect_app(state: AppState, behind_proxy: bool) -> Result<NormalizePath<Router>> {
    let redirect = Router::new()
        .route("/{code}", get(redirect_handler))
        .layer(rate_limit::redirect_layer(behind_proxy)?);

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(redirect)
        .with_state(state)
        .layer(tracing::layer());

    Ok(NormalizePathLayer::trim_trailing_slash().layer(router))
}

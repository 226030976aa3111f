//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_request_body::MapRequestBodyLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use roster_auth::{CorsSettings, TokenVerifier};

use crate::handlers::{health, session};
use crate::middleware::{request_id, token_context, X_REQUEST_ID};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Authenticated
/// - `GET /v1/me` - Caller identity, roles and permissions
/// - `DELETE /v1/session` - Clear the refresh cookie
pub fn create_router<V>(state: GatewayState<V>) -> Router
where
    V: TokenVerifier + 'static,
{
    // Extract config values before moving state
    let cors = build_cors_layer(&state.cors);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Session
        .route("/v1/me", get(session::me))
        .route("/v1/session", delete(session::logout::<V>))
        // Middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout))
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(RequestBodyLimitLayer::new(max_body_bytes))
                .layer(MapRequestBodyLayer::new(axum::body::Body::new))
                .layer(from_fn_with_state(Arc::clone(&state), token_context::<V>)),
        )
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// Credentials are allowed so the refresh cookie can cross origins, which
/// rules out the `*` wildcard. An empty list allows no origins.
fn build_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allow_origins
        .iter()
        .filter_map(|origin| {
            if origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; credentials are enabled");
                return None;
            }
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, X_REQUEST_ID.clone()])
        .expose_headers([X_REQUEST_ID.clone()])
        .allow_credentials(true)
}

//! Liveness probe for load balancers.
//!
//! Reachable without a bearer token. The security configuration is validated
//! before the listener binds, so a gateway that answers here is serving with
//! a usable key and cookie policy.

use axum::Json;
use serde::Serialize;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: &'static str,
    /// Crate version of the running gateway.
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

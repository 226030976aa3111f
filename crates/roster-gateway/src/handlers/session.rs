//! Session endpoints for the authenticated caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use roster_auth::TokenVerifier;

use crate::auth::AuthUser;
use crate::state::GatewayState;

/// The caller's identity as seen by the gateway.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Token subject.
    pub subject: String,
    /// Role names, sorted.
    pub roles: BTreeSet<String>,
    /// Permission names, sorted.
    pub permissions: BTreeSet<String>,
}

/// `GET /v1/me`
pub async fn me(user: AuthUser) -> Json<MeResponse> {
    let user = user.into_inner();
    Json(MeResponse {
        subject: user.subject().to_string(),
        roles: user.roles().clone(),
        permissions: user.permissions().clone(),
    })
}

/// `DELETE /v1/session`
///
/// Clears the refresh cookie. Access tokens stay valid until they expire.
pub async fn logout<V>(
    State(state): State<Arc<GatewayState<V>>>,
    user: AuthUser,
) -> impl IntoResponse
where
    V: TokenVerifier + 'static,
{
    tracing::info!(subject = %user.subject(), "Session cleared");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.cookie_policy.clear_cookie_header())],
    )
}

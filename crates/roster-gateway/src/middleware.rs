//! Request middleware.
//!
//! - [`request_id`] tags every request and response with `x-request-id`.
//! - [`token_context`] verifies the bearer token once and stores the outcome
//!   as a [`TokenContext`] request extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use roster_auth::{TokenContext, TokenError, TokenVerifier};
use roster_core::RequestId;

use crate::state::GatewayState;

/// Request id header name.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const MAX_REQUEST_ID_LEN: usize = 128;

// ============================================================================
// Request id
// ============================================================================

/// Echo a client supplied `x-request-id`, or generate one.
pub async fn request_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| RequestId::generate().to_string(), ToString::to_string);

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}

// ============================================================================
// Token context
// ============================================================================

/// What the `Authorization` header carried.
#[derive(Debug, PartialEq, Eq)]
enum Bearer<'a> {
    Absent,
    Malformed,
    Token(&'a str),
}

fn bearer_token(headers: &HeaderMap) -> Bearer<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Bearer::Absent;
    };
    let Ok(value) = value.to_str() else {
        return Bearer::Malformed;
    };
    match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                Bearer::Malformed
            } else {
                Bearer::Token(token)
            }
        }
        _ => Bearer::Malformed,
    }
}

/// Verify the bearer token and record the outcome for downstream extractors.
///
/// Never rejects on its own: public routes still run with an anonymous or
/// failed context, and protected routes reject through [`AuthUser`](crate::AuthUser).
pub async fn token_context<V>(
    State(state): State<Arc<GatewayState<V>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    V: TokenVerifier + 'static,
{
    let ctx = match bearer_token(request.headers()) {
        Bearer::Absent => TokenContext::anonymous(),
        Bearer::Malformed => {
            tracing::debug!("Authorization header is not a bearer token");
            TokenContext::with_error(TokenError::Invalid)
        }
        Bearer::Token(token) => {
            let result = state.verifier.verify(token);
            if let Err(err) = &result {
                tracing::debug!(error = %err, "Bearer token rejected");
            }
            TokenContext::from_verification(result)
        }
    };

    request.extensions_mut().insert(ctx);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::{Extension, Router};
    use roster_auth::{MockTokenVerifier, RawSecurityEnv, SecurityServices};
    use tower::ServiceExt;

    use crate::config::GatewayConfig;

    fn app() -> Router {
        let services = SecurityServices::init(&RawSecurityEnv::from_pairs([
            ("JWT_SECRET_KEY", "0123456789abcdef0123456789abcdef"),
            ("JWT_ISSUER", "roster-api"),
            ("JWT_AUDIENCE", "roster-web"),
        ]))
        .unwrap();
        let state = Arc::new(GatewayState::new(
            Arc::new(MockTokenVerifier),
            services.cookie_policy.clone(),
            services.config.cors.clone(),
            GatewayConfig::default(),
        ));

        Router::new()
            .route(
                "/",
                get(|Extension(ctx): Extension<TokenContext>| async move {
                    format!("{:?}", ctx.error())
                }),
            )
            .layer(from_fn_with_state(
                Arc::clone(&state),
                token_context::<MockTokenVerifier>,
            ))
            .with_state(state)
    }

    async fn recorded_error(auth: Option<&'static str>) -> String {
        let mut request = http::Request::builder().uri("/");
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn token_context_records_each_outcome() {
        assert_eq!(recorded_error(None).await, "None");
        assert_eq!(recorded_error(Some("Bearer expired-token")).await, "Expired");
        assert_eq!(recorded_error(Some("Bearer junk")).await, "Invalid");
        assert_eq!(recorded_error(Some("Token abc")).await, "Invalid");
        assert_eq!(recorded_error(Some("Bearer test-token:u1::")).await, "None");
    }

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&HeaderMap::new()), Bearer::Absent);
        assert_eq!(bearer_token(&headers("Bearer abc")), Bearer::Token("abc"));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Bearer::Token("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcg==")), Bearer::Malformed);
        assert_eq!(bearer_token(&headers("Bearer")), Bearer::Malformed);
        assert_eq!(bearer_token(&headers("Bearer   ")), Bearer::Malformed);
    }
}

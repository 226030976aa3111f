//! Authentication extractors.
//!
//! [`AuthUser`] reads the [`TokenContext`] recorded by the token-context
//! middleware and resolves it into the request's principal.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use roster_auth::{resolve_current_user, CurrentUser, TokenContext};

use crate::error::ApiError;

/// An authenticated user extracted from the request's token context.
///
/// Routes not wrapped by the token-context middleware see an anonymous
/// context and reject with `token_missing`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub CurrentUser);

impl AuthUser {
    /// The resolved principal.
    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.0
    }

    /// Consume the extractor.
    #[must_use]
    pub fn into_inner(self) -> CurrentUser {
        self.0
    }
}

impl Deref for AuthUser {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let anonymous = TokenContext::anonymous();
            let ctx = parts.extensions.get::<TokenContext>().unwrap_or(&anonymous);
            resolve_current_user(ctx)
                .map(AuthUser)
                .map_err(ApiError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use roster_auth::{Claims, TokenError};

    async fn extract(ctx: Option<TokenContext>) -> Result<AuthUser, ApiError> {
        let mut request = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            request.extensions_mut().insert(ctx);
        }
        let (mut parts, ()) = request.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_user_from_claims() {
        let ctx = TokenContext::with_claims(Claims {
            sub: "u1".into(),
            iat: 0,
            exp: i64::MAX,
            iss: "i".into(),
            aud: "a".into(),
            roles: ["admin".to_string()].into(),
            permissions: Default::default(),
        });
        let user = extract(Some(ctx)).await.unwrap();
        assert_eq!(user.subject().as_str(), "u1");
        assert!(user.has_role("admin"));
    }

    #[tokio::test]
    async fn missing_context_is_token_missing() {
        let err = extract(None).await.unwrap_err();
        assert_eq!(err.code(), "token_missing");
    }

    #[tokio::test]
    async fn expired_context_is_token_expired() {
        let err = extract(Some(TokenContext::with_error(TokenError::Expired)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "token_expired");
    }
}

//! Request-scoped authentication context.
//!
//! An upstream step decodes the bearer token once per request and records the
//! outcome in a [`TokenContext`]. Everything downstream reads that value
//! instead of touching the raw token again.

use std::collections::BTreeSet;

use serde::Serialize;

use roster_core::SubjectId;

use crate::error::{AuthError, Result, TokenKind, VerifyError};
use crate::jwt::{Claims, TokenVerifier};

/// Why the upstream step could not produce claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenError {
    /// No failure recorded.
    #[default]
    None,
    /// The token was authentic but expired.
    Expired,
    /// The token was not trustworthy.
    Invalid,
}

impl From<&VerifyError> for TokenError {
    fn from(err: &VerifyError) -> Self {
        match err {
            VerifyError::Expired => Self::Expired,
            VerifyError::Invalid(_) => Self::Invalid,
        }
    }
}

/// The outcome of decoding one request's access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    claims: Option<Claims>,
    error: TokenError,
}

impl TokenContext {
    /// No token was presented.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A token was presented and verified.
    #[must_use]
    pub fn with_claims(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
            error: TokenError::None,
        }
    }

    /// A token was presented and rejected.
    #[must_use]
    pub fn with_error(error: TokenError) -> Self {
        Self {
            claims: None,
            error,
        }
    }

    /// Record a verification result.
    #[must_use]
    pub fn from_verification(result: std::result::Result<Claims, VerifyError>) -> Self {
        match result {
            Ok(claims) => Self::with_claims(claims),
            Err(err) => Self::with_error(TokenError::from(&err)),
        }
    }

    /// Verify an optional bearer token and record the outcome.
    #[must_use]
    pub fn decode<V>(verifier: &V, token: Option<&str>) -> Self
    where
        V: TokenVerifier + ?Sized,
    {
        match token {
            Some(token) => Self::from_verification(verifier.verify(token)),
            None => Self::anonymous(),
        }
    }

    /// The verified claims, if any.
    #[must_use]
    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// The recorded failure.
    #[must_use]
    pub const fn error(&self) -> TokenError {
        self.error
    }
}

/// The authenticated principal for one request.
///
/// Only constructible from verified [`Claims`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    subject: SubjectId,
    roles: BTreeSet<String>,
    permissions: BTreeSet<String>,
}

impl CurrentUser {
    /// Build the principal from verified claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid` if the subject is blank.
    pub fn from_claims(claims: &Claims) -> Result<Self> {
        let subject = SubjectId::new(&claims.sub).map_err(|_| AuthError::TokenInvalid {
            kind: TokenKind::Access,
        })?;
        Ok(Self {
            subject,
            roles: claims.roles.clone(),
            permissions: claims.permissions.clone(),
        })
    }

    /// The token subject.
    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Role names.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Permission names.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    /// Returns `true` if the user holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns `true` if the user holds `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Resolve the principal for a request.
///
/// A recorded failure takes priority over absent claims, so an expired token
/// is reported as expired rather than missing.
///
/// # Errors
///
/// `TokenExpired`, `TokenInvalid` or `TokenMissing`, all for the access token.
pub fn resolve_current_user(ctx: &TokenContext) -> Result<CurrentUser> {
    let kind = TokenKind::Access;
    match (ctx.error(), ctx.claims()) {
        (TokenError::Expired, _) => Err(AuthError::TokenExpired { kind }),
        (TokenError::Invalid, _) => Err(AuthError::TokenInvalid { kind }),
        (TokenError::None, None) => Err(AuthError::TokenMissing { kind }),
        (TokenError::None, Some(claims)) => CurrentUser::from_claims(claims),
    }
}

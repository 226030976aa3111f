//! Authentication error types.

use std::fmt;

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Which token a request-level failure refers to.
///
/// Only bearer access tokens are verified by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// The short-lived bearer token sent with every request.
    Access,
}

impl TokenKind {
    /// Return the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building the security configuration.
///
/// All of these are fatal at startup: a process must not serve requests
/// with a configuration that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required key is absent or blank after trimming.
    #[error("invalid security config: {key} must not be empty")]
    MissingField {
        /// The environment key.
        key: &'static str,
    },

    /// A key is present but cannot be parsed.
    #[error("invalid security config: {key} {reason}")]
    InvalidValue {
        /// The environment key.
        key: &'static str,
        /// What was wrong with the value.
        reason: String,
    },

    /// A TTL or max-age is zero or negative.
    #[error("invalid security config: {key} must be > 0 (got {value})")]
    NonPositive {
        /// The environment key.
        key: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// `SameSite=None` was configured without `Secure=true`.
    #[error("invalid cookie policy: SameSite=None requires Secure=true")]
    InsecureCookiePolicy,
}

/// Why a token failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The token is authentic but its `exp` has passed.
    #[error("token expired")]
    Expired,

    /// The token cannot be trusted (signature, issuer, audience or format).
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Errors that can occur while authenticating or authorizing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The presented token has expired; the client should refresh.
    #[error("{kind} token expired")]
    TokenExpired {
        /// The token the failure refers to.
        kind: TokenKind,
    },

    /// The presented token is not trustworthy; the client must log in again.
    #[error("{kind} token invalid")]
    TokenInvalid {
        /// The token the failure refers to.
        kind: TokenKind,
    },

    /// No token was presented.
    #[error("{kind} token missing")]
    TokenMissing {
        /// The token the failure refers to.
        kind: TokenKind,
    },

    /// The caller is authenticated but lacks the listed requirements.
    ///
    /// Role requirements are prefixed with `role:`.
    #[error("forbidden: missing {}", .required.join(", "))]
    Forbidden {
        /// The unmet permissions or roles, sorted.
        required: Vec<String>,
    },

    /// A token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(String),
}

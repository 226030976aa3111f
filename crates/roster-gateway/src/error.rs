//! API error types and responses.
//!
//! This module defines the standard error format for all API responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use roster_auth::{AuthError, TokenKind};

/// API error type that implements `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token was authentic but is past its expiry.
    #[error("{kind} token expired")]
    TokenExpired {
        /// Which token expired.
        kind: TokenKind,
    },

    /// The token could not be trusted.
    #[error("{kind} token invalid")]
    TokenInvalid {
        /// Which token was rejected.
        kind: TokenKind,
    },

    /// No token was presented.
    #[error("{kind} token missing")]
    TokenMissing {
        /// Which token was expected.
        kind: TokenKind,
    },

    /// The caller lacks a required permission or role.
    #[error("forbidden")]
    Forbidden {
        /// Missing requirements (`role:` prefixed for roles).
        required: Vec<String>,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

/// Error details.
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Vec<String>>,
}

impl ApiError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenExpired { .. } | Self::TokenInvalid { .. } | Self::TokenMissing { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TokenExpired { .. } => "token_expired",
            Self::TokenInvalid { .. } => "token_invalid",
            Self::TokenMissing { .. } => "token_missing",
            Self::Forbidden { .. } => "forbidden",
            Self::Internal(_) => "internal_error",
        }
    }

    const fn token_kind(&self) -> Option<TokenKind> {
        match self {
            Self::TokenExpired { kind }
            | Self::TokenInvalid { kind }
            | Self::TokenMissing { kind } => Some(*kind),
            Self::Forbidden { .. } | Self::Internal(_) => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let token_type = self.token_kind().map(TokenKind::as_str);
        let message = match &self {
            // Internal details stay in the logs.
            Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let required = match self {
            Self::Forbidden { required } => Some(required),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message,
                token_type,
                required,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired { kind } => Self::TokenExpired { kind },
            AuthError::TokenInvalid { kind } => Self::TokenInvalid { kind },
            AuthError::TokenMissing { kind } => Self::TokenMissing { kind },
            AuthError::Forbidden { required } => Self::Forbidden { required },
            AuthError::Signing(msg) => {
                tracing::error!(error = %msg, "Token signing failed");
                Self::Internal(msg)
            }
        }
    }
}

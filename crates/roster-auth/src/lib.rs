//! Security core for roster.
//!
//! This crate owns everything between "a bearer token arrived" and "this
//! principal may do this":
//!
//! - Validated security configuration loaded from the environment
//! - HMAC-signed access tokens (mint and verify)
//! - Refresh cookie attributes
//! - Request-scoped principal resolution and role/permission guards
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Gateway        │────▶│  TokenVerifier   │
//! │   middleware     │     │  (trait)         │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │ TokenContext           │
//!          │                ┌───────▼──────────┐
//!          │                │  JwtService      │
//!          │                └───────┬──────────┘
//!          │                        │
//! ┌────────▼─────────┐     ┌───────▼──────────┐
//! │  Guard /         │     │  SecurityConfig  │
//! │  CurrentUser     │     │  (validated env) │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use roster_auth::{Guard, RawSecurityEnv, SecurityServices, TokenContext};
//! use roster_core::SubjectId;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = RawSecurityEnv::from_pairs([
//!     ("JWT_SECRET_KEY", "0123456789abcdef0123456789abcdef"),
//!     ("JWT_ISSUER", "roster-api"),
//!     ("JWT_AUDIENCE", "roster-web"),
//! ]);
//! let services = SecurityServices::init(&raw)?;
//!
//! let subject = SubjectId::new("teacher-7")?;
//! let token = services.jwt.mint(&subject, ["teacher"], ["student:read"])?;
//!
//! // In a request handler:
//! let ctx = TokenContext::decode(&services.jwt, Some(token.as_str()));
//! let user = Guard::authenticated()
//!     .permissions(["student:read"])
//!     .any_role(["teacher", "admin"])
//!     .authorize(&ctx)?;
//!
//! assert_eq!(user.subject().as_str(), "teacher-7");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod clock;
pub mod config;
pub mod context;
pub mod cookie;
pub mod error;
pub mod guard;
pub mod jwt;

use std::sync::Arc;

pub use clock::{Clock, SystemClock};
pub use config::{
    CorsSettings, JwtAlgorithm, JwtSettings, RawSecurityEnv, RefreshCookieSettings,
    RefreshSessionSettings, SameSite, SecretKey, SecurityConfig,
};
pub use context::{resolve_current_user, CurrentUser, TokenContext, TokenError};
pub use cookie::{CookieAttributes, RefreshCookiePolicy};
pub use error::{AuthError, ConfigError, Result, TokenKind, VerifyError};
pub use guard::{require_current_user, require_permissions, require_roles, Guard};
pub use jwt::{Claims, JwtService, TokenVerifier};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::FixedClock;
#[cfg(any(test, feature = "test-utils"))]
pub use jwt::MockTokenVerifier;

/// The process-wide security services, built once at startup.
#[derive(Debug, Clone)]
pub struct SecurityServices {
    /// Validated configuration.
    pub config: Arc<SecurityConfig>,
    /// Access-token issuance and verification.
    pub jwt: JwtService,
    /// Refresh cookie attributes.
    pub cookie_policy: RefreshCookiePolicy,
}

impl SecurityServices {
    /// Validate the configuration and build every service over it.
    ///
    /// # Errors
    ///
    /// Returns the configuration error; nothing is built in that case.
    pub fn init(raw: &RawSecurityEnv) -> std::result::Result<Arc<Self>, ConfigError> {
        let config = Arc::new(SecurityConfig::from_raw(raw)?);
        Ok(Arc::new(Self::from_config(config)))
    }

    /// Build from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the configuration error.
    pub fn from_env() -> std::result::Result<Arc<Self>, ConfigError> {
        Self::init(&RawSecurityEnv::from_env())
    }

    /// Build over an already validated configuration.
    #[must_use]
    pub fn from_config(config: Arc<SecurityConfig>) -> Self {
        Self {
            jwt: JwtService::new(Arc::clone(&config)),
            cookie_policy: RefreshCookiePolicy::new(Arc::clone(&config)),
            config,
        }
    }
}

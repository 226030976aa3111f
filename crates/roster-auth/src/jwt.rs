//! JWT issuance and verification.
//!
//! [`JwtService`] signs access tokens carrying the subject and its
//! authorization payload, and verifies them in a fixed order: signature,
//! issuer, audience, then expiry. Only a token that passes the first three
//! checks can be reported as [`VerifyError::Expired`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use roster_core::SubjectId;

use crate::clock::{Clock, SystemClock};
use crate::config::SecurityConfig;
use crate::error::{AuthError, Result, VerifyError};

/// The payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject the token was issued to.
    pub sub: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Role names.
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Permission names.
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

/// Anything that can turn a bearer token into verified claims.
///
/// The gateway is generic over this so tests and dev builds can swap in
/// [`MockTokenVerifier`].
pub trait TokenVerifier: Send + Sync {
    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `VerifyError::Expired` for an authentic but lapsed token and
    /// `VerifyError::Invalid` for anything untrustworthy.
    fn verify(&self, token: &str) -> std::result::Result<Claims, VerifyError>;
}

/// Mints and verifies HMAC-signed access tokens.
#[derive(Clone)]
pub struct JwtService {
    config: Arc<SecurityConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    /// Create a service on the wall clock.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a service with an explicit time source.
    #[must_use]
    pub fn with_clock(config: Arc<SecurityConfig>, clock: Arc<dyn Clock>) -> Self {
        let jwt = &config.jwt;
        let encoding_key = EncodingKey::from_secret(jwt.secret_key.expose_bytes());
        let decoding_key = DecodingKey::from_secret(jwt.secret_key.expose_bytes());

        // Expiry is checked against `clock` after issuer and audience pass.
        let mut validation = Validation::new(jwt.algorithm.to_algorithm());
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        validation.set_issuer(&[&jwt.issuer]);
        validation.set_audience(&[&jwt.audience]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    /// Sign an access token for `subject` expiring one TTL from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if the expiry is out of range or
    /// encoding fails.
    pub fn mint<R, P>(&self, subject: &SubjectId, roles: R, permissions: P) -> Result<String>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(self.access_token_ttl())
            .ok_or_else(|| AuthError::Signing("access token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject.as_str().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt.issuer.clone(),
            aud: self.config.jwt.audience.clone(),
            roles: roles.into_iter().map(Into::into).collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        };

        let header = Header::new(self.config.jwt.algorithm.to_algorithm());
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        tracing::debug!(subject = %subject, exp = claims.exp, "Access token minted");
        Ok(token)
    }

    /// Verify signature, issuer, audience and expiry, in that order.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::verify`].
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, VerifyError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::InvalidSignature => "invalid signature".to_string(),
                ErrorKind::InvalidIssuer => "invalid issuer".to_string(),
                ErrorKind::InvalidAudience => "invalid audience".to_string(),
                ErrorKind::InvalidAlgorithm => "unexpected algorithm".to_string(),
                ErrorKind::MissingRequiredClaim(claim) => format!("missing claim {claim}"),
                _ => format!("malformed token: {e}"),
            };
            tracing::debug!(reason = %reason, "Token rejected");
            VerifyError::Invalid(reason)
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            tracing::debug!("Token rejected: blank subject");
            return Err(VerifyError::Invalid("blank subject".to_string()));
        }

        let now = self.clock.now().timestamp();
        if now > claims.exp {
            tracing::debug!(subject = %claims.sub, exp = claims.exp, now, "Token expired");
            return Err(VerifyError::Expired);
        }

        Ok(claims)
    }

    /// The configured access-token lifetime, saturating at `Duration::MAX`.
    #[must_use]
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.config.jwt.access_token_ttl_minutes)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// The issuer stamped into and required of every token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.config.jwt.issuer
    }

    /// The audience stamped into and required of every token.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.config.jwt.audience
    }
}

impl TokenVerifier for JwtService {
    fn verify(&self, token: &str) -> std::result::Result<Claims, VerifyError> {
        Self::verify(self, token)
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.config.jwt.algorithm)
            .field("issuer", &self.config.jwt.issuer)
            .field("audience", &self.config.jwt.audience)
            .field("access_token_ttl_minutes", &self.config.jwt.access_token_ttl_minutes)
            .finish_non_exhaustive()
    }
}

/// A mock verifier for tests and dev mode.
///
/// Accepts `test-token:<subject>:<roles>:<permissions>` where roles and
/// permissions are comma-separated (either may be empty). The literal
/// `expired-token` verifies as expired; anything else is invalid.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct MockTokenVerifier;

#[cfg(any(test, feature = "test-utils"))]
impl TokenVerifier for MockTokenVerifier {
    fn verify(&self, token: &str) -> std::result::Result<Claims, VerifyError> {
        if token == "expired-token" {
            return Err(VerifyError::Expired);
        }

        let expected = || {
            VerifyError::Invalid("expected test-token:<subject>:<roles>:<permissions>".to_string())
        };
        let rest = token.strip_prefix("test-token:").ok_or_else(expected)?;
        let parts: Vec<&str> = rest.split(':').collect();
        let [sub, roles, permissions] = parts.as_slice() else {
            return Err(expected());
        };
        if sub.trim().is_empty() {
            return Err(VerifyError::Invalid("blank subject".to_string()));
        }

        let split = |list: &str| -> BTreeSet<String> {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect()
        };
        let now = chrono::Utc::now();

        Ok(Claims {
            sub: (*sub).to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
            iss: "mock".to_string(),
            aud: "mock".to_string(),
            roles: split(*roles),
            permissions: split(*permissions),
        })
    }
}

//! Security configuration.
//!
//! Raw environment values are collected into a [`RawSecurityEnv`], assembled
//! into a candidate [`SecurityConfig`] on top of the defaults, and then checked
//! in a single [`SecurityConfig::validate`] pass. Nothing downstream ever sees a
//! configuration that failed validation.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::ConfigError;

/// Environment key for the signing algorithm.
pub const JWT_ALGORITHM: &str = "JWT_ALGORITHM";
/// Environment key for the signing secret.
pub const JWT_SECRET_KEY: &str = "JWT_SECRET_KEY";
/// Environment key for the expected `iss` claim.
pub const JWT_ISSUER: &str = "JWT_ISSUER";
/// Environment key for the expected `aud` claim.
pub const JWT_AUDIENCE: &str = "JWT_AUDIENCE";
/// Environment key for the access-token TTL in minutes.
pub const ACCESS_TOKEN_EXPIRED_MINUTES: &str = "ACCESS_TOKEN_EXPIRED_MINUTES";
/// Environment key for the refresh-session TTL in minutes.
pub const REFRESH_SESSION_TTL_MINUTES: &str = "REFRESH_SESSION_TTL_MINUTES";
/// Environment key overriding the refresh cookie `Secure` flag.
pub const REFRESH_COOKIE_SECURE: &str = "REFRESH_COOKIE_SECURE";
/// Environment key overriding the refresh cookie `SameSite` attribute.
pub const REFRESH_COOKIE_SAMESITE: &str = "REFRESH_COOKIE_SAMESITE";
/// Environment key overriding the refresh cookie `Path`.
pub const REFRESH_COOKIE_PATH: &str = "REFRESH_COOKIE_PATH";
/// Environment key overriding the refresh cookie `Max-Age`.
pub const REFRESH_COOKIE_MAX_AGE_SECONDS: &str = "REFRESH_COOKIE_MAX_AGE_SECONDS";
/// Environment key for the comma-separated CORS origins.
pub const CORS_ALLOW_ORIGINS: &str = "CORS_ALLOW_ORIGINS";

/// Secrets shorter than this are accepted but logged as weak.
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Upper bound for every TTL, in minutes (100 years).
pub const MAX_TTL_MINUTES: i64 = 100 * 365 * 24 * 60;

// =============================================================================
// Enumerated settings
// =============================================================================

/// HMAC signing algorithms supported for access tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl JwtAlgorithm {
    /// The matching `jsonwebtoken` algorithm.
    #[must_use]
    pub const fn to_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }
}

impl FromStr for JwtAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            other => Err(format!(
                "unsupported algorithm {other:?} (expected HS256, HS384 or HS512)"
            )),
        }
    }
}

/// The cookie `SameSite` attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameSite {
    /// Never sent on cross-site requests.
    Strict,
    /// Sent on top-level cross-site navigations.
    #[default]
    Lax,
    /// Always sent; requires `Secure`.
    None,
}

impl SameSite {
    /// The attribute value as written in a `Set-Cookie` header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            other => Err(format!("unsupported SameSite {other:?} (expected strict, lax or none)")),
        }
    }
}

// =============================================================================
// SecretKey
// =============================================================================

/// The token signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw key material.
    #[must_use]
    pub fn expose_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

// =============================================================================
// Settings groups
// =============================================================================

/// Access-token signing and claim-matching parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    /// Signing algorithm.
    pub algorithm: JwtAlgorithm,
    /// Signing and verification secret.
    pub secret_key: SecretKey,
    /// Expected and minted `iss` claim.
    pub issuer: String,
    /// Expected and minted `aud` claim.
    pub audience: String,
    /// Access-token lifetime in minutes.
    pub access_token_ttl_minutes: i64,
}

/// Server-side refresh session lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSessionSettings {
    /// Refresh-session lifetime in minutes.
    pub ttl_minutes: i64,
}

impl RefreshSessionSettings {
    /// Default lifetime: 14 days.
    pub const DEFAULT_TTL_MINUTES: i64 = 20_160;
}

impl Default for RefreshSessionSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: Self::DEFAULT_TTL_MINUTES,
        }
    }
}

/// Attributes of the cookie that carries the refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookieSettings {
    /// Cookie name.
    pub name: String,
    /// `Secure` flag.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Path` attribute.
    pub path: String,
    /// `Max-Age` override in seconds.
    pub max_age_seconds: Option<i64>,
}

impl Default for RefreshCookieSettings {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            secure: true,
            same_site: SameSite::Lax,
            path: "/v1/auth".to_string(),
            max_age_seconds: None,
        }
    }
}

/// Cross-origin settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsSettings {
    /// Allowed origins in configuration order. Empty means none.
    pub allow_origins: Vec<String>,
}

impl CorsSettings {
    /// Parse a comma-separated origin list, dropping blank entries.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let allow_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToString::to_string)
            .collect();
        Self { allow_origins }
    }
}

// =============================================================================
// RawSecurityEnv
// =============================================================================

/// Unparsed security settings, one optional string per recognized key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawSecurityEnv {
    /// `JWT_ALGORITHM`
    pub jwt_algorithm: Option<String>,
    /// `JWT_SECRET_KEY`
    pub jwt_secret_key: Option<String>,
    /// `JWT_ISSUER`
    pub jwt_issuer: Option<String>,
    /// `JWT_AUDIENCE`
    pub jwt_audience: Option<String>,
    /// `ACCESS_TOKEN_EXPIRED_MINUTES`
    pub access_token_expired_minutes: Option<String>,
    /// `REFRESH_SESSION_TTL_MINUTES`
    pub refresh_session_ttl_minutes: Option<String>,
    /// `REFRESH_COOKIE_SECURE`
    pub refresh_cookie_secure: Option<String>,
    /// `REFRESH_COOKIE_SAMESITE`
    pub refresh_cookie_samesite: Option<String>,
    /// `REFRESH_COOKIE_PATH`
    pub refresh_cookie_path: Option<String>,
    /// `REFRESH_COOKIE_MAX_AGE_SECONDS`
    pub refresh_cookie_max_age_seconds: Option<String>,
    /// `CORS_ALLOW_ORIGINS`
    pub cors_allow_origins: Option<String>,
}

impl RawSecurityEnv {
    /// Read every recognized key from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from key/value pairs. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            jwt_algorithm: lookup(JWT_ALGORITHM),
            jwt_secret_key: lookup(JWT_SECRET_KEY),
            jwt_issuer: lookup(JWT_ISSUER),
            jwt_audience: lookup(JWT_AUDIENCE),
            access_token_expired_minutes: lookup(ACCESS_TOKEN_EXPIRED_MINUTES),
            refresh_session_ttl_minutes: lookup(REFRESH_SESSION_TTL_MINUTES),
            refresh_cookie_secure: lookup(REFRESH_COOKIE_SECURE),
            refresh_cookie_samesite: lookup(REFRESH_COOKIE_SAMESITE),
            refresh_cookie_path: lookup(REFRESH_COOKIE_PATH),
            refresh_cookie_max_age_seconds: lookup(REFRESH_COOKIE_MAX_AGE_SECONDS),
            cors_allow_origins: lookup(CORS_ALLOW_ORIGINS),
        }
    }
}

impl fmt::Debug for RawSecurityEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSecurityEnv")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "jwt_secret_key",
                &self.jwt_secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("access_token_expired_minutes", &self.access_token_expired_minutes)
            .field("refresh_session_ttl_minutes", &self.refresh_session_ttl_minutes)
            .field("refresh_cookie_secure", &self.refresh_cookie_secure)
            .field("refresh_cookie_samesite", &self.refresh_cookie_samesite)
            .field("refresh_cookie_path", &self.refresh_cookie_path)
            .field(
                "refresh_cookie_max_age_seconds",
                &self.refresh_cookie_max_age_seconds,
            )
            .field("cors_allow_origins", &self.cors_allow_origins)
            .finish()
    }
}

// =============================================================================
// SecurityConfig
// =============================================================================

/// Validated, immutable security policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Access-token parameters.
    pub jwt: JwtSettings,
    /// Refresh-session lifetime.
    pub refresh_session: RefreshSessionSettings,
    /// Refresh cookie attributes.
    pub refresh_cookie: RefreshCookieSettings,
    /// Allowed CORS origins.
    pub cors: CorsSettings,
}

impl SecurityConfig {
    /// Default access-token lifetime in minutes.
    pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

    /// Build and validate the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first field-level or cross-field violation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_raw(&RawSecurityEnv::from_env())
    }

    /// Build and validate the configuration from raw values.
    ///
    /// Refresh-cookie keys only override the defaults when present.
    ///
    /// # Errors
    ///
    /// Returns the first field-level or cross-field violation.
    pub fn from_raw(raw: &RawSecurityEnv) -> Result<Self, ConfigError> {
        let algorithm = match raw.jwt_algorithm.as_deref() {
            Some(value) => {
                value
                    .parse::<JwtAlgorithm>()
                    .map_err(|reason| ConfigError::InvalidValue {
                        key: JWT_ALGORITHM,
                        reason,
                    })?
            }
            None => JwtAlgorithm::default(),
        };

        let jwt = JwtSettings {
            algorithm,
            secret_key: SecretKey::new(raw.jwt_secret_key.clone().unwrap_or_default()),
            issuer: trimmed(raw.jwt_issuer.as_deref()),
            audience: trimmed(raw.jwt_audience.as_deref()),
            access_token_ttl_minutes: parse_int(
                ACCESS_TOKEN_EXPIRED_MINUTES,
                raw.access_token_expired_minutes.as_deref(),
            )?
            .unwrap_or(Self::DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
        };

        let refresh_session = RefreshSessionSettings {
            ttl_minutes: parse_int(
                REFRESH_SESSION_TTL_MINUTES,
                raw.refresh_session_ttl_minutes.as_deref(),
            )?
            .unwrap_or(RefreshSessionSettings::DEFAULT_TTL_MINUTES),
        };

        let refresh_cookie = merge_refresh_cookie(RefreshCookieSettings::default(), raw)?;

        let cors = raw
            .cors_allow_origins
            .as_deref()
            .map(CorsSettings::parse)
            .unwrap_or_default();

        let config = Self {
            jwt,
            refresh_session,
            refresh_cookie,
            cors,
        };
        config.validate()?;

        if config.jwt.secret_key.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                min_len = RECOMMENDED_SECRET_LEN,
                "JWT secret is shorter than recommended"
            );
        }

        tracing::info!(
            algorithm = ?config.jwt.algorithm,
            issuer = %config.jwt.issuer,
            audience = %config.jwt.audience,
            access_token_ttl_minutes = config.jwt.access_token_ttl_minutes,
            refresh_session_ttl_minutes = config.refresh_session.ttl_minutes,
            cookie_secure = config.refresh_cookie.secure,
            cookie_same_site = %config.refresh_cookie.same_site,
            cors_origins = config.cors.allow_origins.len(),
            "Security configuration loaded"
        );

        Ok(config)
    }

    /// Check every field-level rule, then the cookie cross-field rule.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::MissingField { key: JWT_ISSUER });
        }
        if self.jwt.audience.trim().is_empty() {
            return Err(ConfigError::MissingField { key: JWT_AUDIENCE });
        }
        if self.jwt.secret_key.is_blank() {
            return Err(ConfigError::MissingField {
                key: JWT_SECRET_KEY,
            });
        }
        ensure_in_range(
            ACCESS_TOKEN_EXPIRED_MINUTES,
            self.jwt.access_token_ttl_minutes,
            MAX_TTL_MINUTES,
        )?;
        ensure_in_range(
            REFRESH_SESSION_TTL_MINUTES,
            self.refresh_session.ttl_minutes,
            MAX_TTL_MINUTES,
        )?;
        if let Some(max_age) = self.refresh_cookie.max_age_seconds {
            ensure_in_range(REFRESH_COOKIE_MAX_AGE_SECONDS, max_age, MAX_TTL_MINUTES * 60)?;
        }

        if self.refresh_cookie.same_site == SameSite::None && !self.refresh_cookie.secure {
            return Err(ConfigError::InsecureCookiePolicy);
        }
        Ok(())
    }
}

fn merge_refresh_cookie(
    mut cookie: RefreshCookieSettings,
    raw: &RawSecurityEnv,
) -> Result<RefreshCookieSettings, ConfigError> {
    if let Some(value) = raw.refresh_cookie_secure.as_deref() {
        cookie.secure = parse_bool(REFRESH_COOKIE_SECURE, value)?;
    }
    if let Some(value) = raw.refresh_cookie_samesite.as_deref() {
        cookie.same_site = value
            .parse::<SameSite>()
            .map_err(|reason| ConfigError::InvalidValue {
                key: REFRESH_COOKIE_SAMESITE,
                reason,
            })?;
    }
    if let Some(path) = raw
        .refresh_cookie_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        cookie.path = path.to_string();
    }
    if let Some(max_age) = parse_int(
        REFRESH_COOKIE_MAX_AGE_SECONDS,
        raw.refresh_cookie_max_age_seconds.as_deref(),
    )? {
        cookie.max_age_seconds = Some(max_age);
    }
    Ok(cookie)
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn parse_int(key: &'static str, value: Option<&str>) -> Result<Option<i64>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                key,
                reason: format!("must be an integer (got {v:?})"),
            })
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be a boolean (got {value:?})"),
        }),
    }
}

fn ensure_in_range(key: &'static str, value: i64, max: i64) -> Result<(), ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositive { key, value });
    }
    if value > max {
        return Err(ConfigError::InvalidValue {
            key,
            reason: format!("must be at most {max} (got {value})"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn base_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            (JWT_SECRET_KEY, SECRET),
            (JWT_ISSUER, "roster-api"),
            (JWT_AUDIENCE, "roster-web"),
        ]
    }

    fn build<'a>(extra: &[(&'static str, &'a str)]) -> Result<SecurityConfig, ConfigError> {
        let mut pairs: Vec<(&'static str, &'a str)> = base_pairs();
        pairs.extend_from_slice(extra);
        SecurityConfig::from_raw(&RawSecurityEnv::from_pairs(pairs))
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = build(&[]).unwrap();
        assert_eq!(config.jwt.algorithm, JwtAlgorithm::HS256);
        assert_eq!(config.jwt.issuer, "roster-api");
        assert_eq!(config.jwt.audience, "roster-web");
        assert_eq!(config.jwt.access_token_ttl_minutes, 15);
        assert_eq!(config.refresh_session.ttl_minutes, 20_160);
        assert_eq!(config.refresh_cookie, RefreshCookieSettings::default());
        assert!(config.cors.allow_origins.is_empty());
    }

    #[test]
    fn construction_is_idempotent() {
        let raw = RawSecurityEnv::from_pairs(base_pairs());
        let first = SecurityConfig::from_raw(&raw).unwrap();
        let second = SecurityConfig::from_raw(&raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn issuer_and_audience_are_trimmed() {
        let raw = RawSecurityEnv::from_pairs([
            (JWT_SECRET_KEY, SECRET),
            (JWT_ISSUER, "  roster-api "),
            (JWT_AUDIENCE, "\troster-web\n"),
        ]);
        let config = SecurityConfig::from_raw(&raw).unwrap();
        assert_eq!(config.jwt.issuer, "roster-api");
        assert_eq!(config.jwt.audience, "roster-web");
    }

    #[test]
    fn blank_required_fields_name_the_key() {
        for key in [JWT_ISSUER, JWT_AUDIENCE, JWT_SECRET_KEY] {
            let pairs: Vec<_> = base_pairs()
                .into_iter()
                .map(|(k, v)| if k == key { (k, "   ") } else { (k, v) })
                .collect();
            let err = SecurityConfig::from_raw(&RawSecurityEnv::from_pairs(pairs)).unwrap_err();
            assert_eq!(err, ConfigError::MissingField { key });
        }
    }

    #[test]
    fn absent_secret_is_rejected() {
        let raw = RawSecurityEnv::from_pairs([(JWT_ISSUER, "a"), (JWT_AUDIENCE, "b")]);
        assert_eq!(
            SecurityConfig::from_raw(&raw).unwrap_err(),
            ConfigError::MissingField {
                key: JWT_SECRET_KEY
            }
        );
    }

    #[test]
    fn ttls_must_be_positive() {
        assert_eq!(
            build(&[(ACCESS_TOKEN_EXPIRED_MINUTES, "0")]).unwrap_err(),
            ConfigError::NonPositive {
                key: ACCESS_TOKEN_EXPIRED_MINUTES,
                value: 0
            }
        );
        assert_eq!(
            build(&[(REFRESH_SESSION_TTL_MINUTES, "-5")]).unwrap_err(),
            ConfigError::NonPositive {
                key: REFRESH_SESSION_TTL_MINUTES,
                value: -5
            }
        );
        assert_eq!(
            build(&[(REFRESH_COOKIE_MAX_AGE_SECONDS, "0")]).unwrap_err(),
            ConfigError::NonPositive {
                key: REFRESH_COOKIE_MAX_AGE_SECONDS,
                value: 0
            }
        );
    }

    #[test]
    fn ttls_beyond_the_ceiling_are_rejected() {
        let err = build(&[(ACCESS_TOKEN_EXPIRED_MINUTES, "9223372036854775807")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ACCESS_TOKEN_EXPIRED_MINUTES,
                ..
            }
        ));

        let err = build(&[(REFRESH_SESSION_TTL_MINUTES, "9223372036854775807")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: REFRESH_SESSION_TTL_MINUTES,
                ..
            }
        ));

        let err = build(&[(REFRESH_COOKIE_MAX_AGE_SECONDS, "9223372036854775807")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: REFRESH_COOKIE_MAX_AGE_SECONDS,
                ..
            }
        ));

        let at_ceiling = MAX_TTL_MINUTES.to_string();
        let config = build(&[(ACCESS_TOKEN_EXPIRED_MINUTES, at_ceiling.as_str())]).unwrap();
        assert_eq!(config.jwt.access_token_ttl_minutes, MAX_TTL_MINUTES);
    }

    #[test]
    fn non_numeric_ttl_is_invalid_value() {
        let err = build(&[(ACCESS_TOKEN_EXPIRED_MINUTES, "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ACCESS_TOKEN_EXPIRED_MINUTES,
                ..
            }
        ));
    }

    #[test]
    fn algorithm_parsing() {
        let config = build(&[(JWT_ALGORITHM, "hs512")]).unwrap();
        assert_eq!(config.jwt.algorithm, JwtAlgorithm::HS512);
        assert_eq!(config.jwt.algorithm.to_algorithm(), Algorithm::HS512);

        let err = build(&[(JWT_ALGORITHM, "RS256")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: JWT_ALGORITHM,
                ..
            }
        ));
    }

    #[test]
    fn cookie_overrides_merge_only_when_present() {
        let config = build(&[(REFRESH_COOKIE_SAMESITE, "Strict")]).unwrap();
        let defaults = RefreshCookieSettings::default();
        assert_eq!(config.refresh_cookie.same_site, SameSite::Strict);
        assert_eq!(config.refresh_cookie.secure, defaults.secure);
        assert_eq!(config.refresh_cookie.path, defaults.path);
        assert_eq!(config.refresh_cookie.max_age_seconds, None);
    }

    #[test]
    fn cookie_overrides_apply_every_field() {
        let config = build(&[
            (REFRESH_COOKIE_SECURE, "false"),
            (REFRESH_COOKIE_SAMESITE, "lax"),
            (REFRESH_COOKIE_PATH, " /auth/refresh "),
            (REFRESH_COOKIE_MAX_AGE_SECONDS, "3600"),
        ])
        .unwrap();
        assert!(!config.refresh_cookie.secure);
        assert_eq!(config.refresh_cookie.same_site, SameSite::Lax);
        assert_eq!(config.refresh_cookie.path, "/auth/refresh");
        assert_eq!(config.refresh_cookie.max_age_seconds, Some(3600));
    }

    #[test]
    fn blank_cookie_path_keeps_default() {
        let config = build(&[(REFRESH_COOKIE_PATH, "  ")]).unwrap();
        assert_eq!(config.refresh_cookie.path, "/v1/auth");
    }

    #[test]
    fn same_site_none_requires_secure() {
        let err = build(&[
            (REFRESH_COOKIE_SAMESITE, "none"),
            (REFRESH_COOKIE_SECURE, "false"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::InsecureCookiePolicy);

        let config = build(&[
            (REFRESH_COOKIE_SAMESITE, "None"),
            (REFRESH_COOKIE_SECURE, "true"),
        ])
        .unwrap();
        assert_eq!(config.refresh_cookie.same_site, SameSite::None);
    }

    #[test]
    fn same_site_none_with_default_secure_is_allowed() {
        let config = build(&[(REFRESH_COOKIE_SAMESITE, "none")]).unwrap();
        assert!(config.refresh_cookie.secure);
    }

    #[test]
    fn validate_rejects_hand_built_insecure_cookie() {
        let mut config = build(&[]).unwrap();
        config.refresh_cookie.same_site = SameSite::None;
        config.refresh_cookie.secure = false;
        assert_eq!(config.validate(), Err(ConfigError::InsecureCookiePolicy));
    }

    #[test]
    fn invalid_boolean_and_same_site() {
        assert!(matches!(
            build(&[(REFRESH_COOKIE_SECURE, "maybe")]).unwrap_err(),
            ConfigError::InvalidValue {
                key: REFRESH_COOKIE_SECURE,
                ..
            }
        ));
        assert!(matches!(
            build(&[(REFRESH_COOKIE_SAMESITE, "sometimes")]).unwrap_err(),
            ConfigError::InvalidValue {
                key: REFRESH_COOKIE_SAMESITE,
                ..
            }
        ));
    }

    #[test]
    fn cors_origins_are_split_trimmed_and_filtered() {
        let config = build(&[(CORS_ALLOW_ORIGINS, "https://a.com, ,https://b.com")]).unwrap();
        assert_eq!(
            config.cors.allow_origins,
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
    }

    #[test]
    fn cors_keeps_order_and_duplicates() {
        let cors = CorsSettings::parse("https://b.com,https://a.com,https://b.com");
        assert_eq!(
            cors.allow_origins,
            vec!["https://b.com", "https://a.com", "https://b.com"]
        );
        assert!(CorsSettings::parse(" , ,").allow_origins.is_empty());
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let raw = RawSecurityEnv::from_pairs(base_pairs());
        let config = SecurityConfig::from_raw(&raw).unwrap();
        assert!(!format!("{raw:?}").contains(SECRET));
        assert!(!format!("{config:?}").contains(SECRET));
    }
}

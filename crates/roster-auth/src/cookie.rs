//! Refresh cookie policy.
//!
//! The policy only answers "which attributes must the refresh cookie carry".
//! Writing the header onto a response belongs to the HTTP layer.

use std::sync::Arc;

use crate::config::{SameSite, SecurityConfig};

/// Concrete attributes to stamp onto an outgoing refresh cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieAttributes {
    /// Cookie name.
    pub name: String,
    /// `Secure` flag.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Path` attribute.
    pub path: String,
    /// `Max-Age` in seconds.
    pub max_age_seconds: i64,
    /// `HttpOnly` flag. Always set for refresh cookies.
    pub http_only: bool,
}

/// Derives refresh cookie attributes from the validated [`SecurityConfig`].
///
/// `SameSite=None` without `Secure` cannot reach this type: the
/// configuration refuses to build in that case.
#[derive(Debug, Clone)]
pub struct RefreshCookiePolicy {
    config: Arc<SecurityConfig>,
}

impl RefreshCookiePolicy {
    /// Create the policy over a validated configuration.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        Self { config }
    }

    /// The attributes for the refresh cookie.
    ///
    /// `max_age_seconds` is the configured override, or the refresh-session
    /// lifetime when no override is set.
    #[must_use]
    pub fn attributes(&self) -> CookieAttributes {
        let cookie = &self.config.refresh_cookie;
        let max_age_seconds = cookie
            .max_age_seconds
            .unwrap_or(self.config.refresh_session.ttl_minutes.saturating_mul(60));

        CookieAttributes {
            name: cookie.name.clone(),
            secure: cookie.secure,
            same_site: cookie.same_site,
            path: cookie.path.clone(),
            max_age_seconds,
            http_only: true,
        }
    }

    /// The cookie name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.refresh_cookie.name
    }

    /// Render a `Set-Cookie` value carrying `value`.
    #[must_use]
    pub fn set_cookie_header(&self, value: &str) -> String {
        let attrs = self.attributes();
        render(&attrs, value, attrs.max_age_seconds)
    }

    /// Render a `Set-Cookie` value that removes the cookie.
    #[must_use]
    pub fn clear_cookie_header(&self) -> String {
        render(&self.attributes(), "", 0)
    }
}

fn render(attrs: &CookieAttributes, value: &str, max_age: i64) -> String {
    let mut header = format!(
        "{}={}; Path={}; Max-Age={}; SameSite={}",
        attrs.name, value, attrs.path, max_age, attrs.same_site
    );
    if attrs.http_only {
        header.push_str("; HttpOnly");
    }
    if attrs.secure {
        header.push_str("; Secure");
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawSecurityEnv;

    fn policy(extra: &[(&str, &str)]) -> RefreshCookiePolicy {
        let mut pairs = vec![
            ("JWT_SECRET_KEY", "0123456789abcdef0123456789abcdef"),
            ("JWT_ISSUER", "roster-api"),
            ("JWT_AUDIENCE", "roster-web"),
        ];
        pairs.extend_from_slice(extra);
        let config = SecurityConfig::from_raw(&RawSecurityEnv::from_pairs(pairs)).unwrap();
        RefreshCookiePolicy::new(Arc::new(config))
    }

    #[test]
    fn default_attributes() {
        let attrs = policy(&[]).attributes();
        assert_eq!(
            attrs,
            CookieAttributes {
                name: "refresh_token".to_string(),
                secure: true,
                same_site: SameSite::Lax,
                path: "/v1/auth".to_string(),
                max_age_seconds: 20_160 * 60,
                http_only: true,
            }
        );
    }

    #[test]
    fn max_age_falls_back_to_session_ttl() {
        let attrs = policy(&[("REFRESH_SESSION_TTL_MINUTES", "30")]).attributes();
        assert_eq!(attrs.max_age_seconds, 1800);
    }

    #[test]
    fn explicit_max_age_wins() {
        let attrs = policy(&[
            ("REFRESH_SESSION_TTL_MINUTES", "30"),
            ("REFRESH_COOKIE_MAX_AGE_SECONDS", "600"),
        ])
        .attributes();
        assert_eq!(attrs.max_age_seconds, 600);
    }

    #[test]
    fn set_cookie_header_carries_every_attribute() {
        let policy = policy(&[
            ("REFRESH_COOKIE_SAMESITE", "none"),
            ("REFRESH_COOKIE_PATH", "/auth/refresh"),
            ("REFRESH_COOKIE_MAX_AGE_SECONDS", "3600"),
        ]);
        assert_eq!(
            policy.set_cookie_header("abc"),
            "refresh_token=abc; Path=/auth/refresh; Max-Age=3600; SameSite=None; HttpOnly; Secure"
        );
    }

    #[test]
    fn insecure_cookie_omits_secure_flag() {
        let policy = policy(&[("REFRESH_COOKIE_SECURE", "false")]);
        let header = policy.set_cookie_header("abc");
        assert!(!header.contains("Secure"));
        assert!(header.contains("SameSite=Lax"));
    }

    #[test]
    fn clear_cookie_header_expires_immediately() {
        let policy = policy(&[]);
        assert_eq!(
            policy.clear_cookie_header(),
            "refresh_token=; Path=/v1/auth; Max-Age=0; SameSite=Lax; HttpOnly; Secure"
        );
        assert_eq!(policy.name(), "refresh_token");
    }
}

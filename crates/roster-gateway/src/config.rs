//! Gateway configuration types.
//!
//! Security settings (keys, TTLs, cookie policy, CORS origins) live in
//! [`roster_auth::SecurityConfig`]. This module only covers the HTTP server.

use std::time::Duration;

use thiserror::Error;

/// Listen address key.
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
/// Request timeout key.
pub const REQUEST_TIMEOUT_SECONDS: &str = "REQUEST_TIMEOUT_SECONDS";
/// Body limit key.
pub const MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";

/// A gateway setting that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid gateway config: {key}={value:?} is not a positive integer")]
pub struct InvalidSetting {
    /// The environment key.
    pub key: &'static str,
    /// The raw value.
    pub value: String,
}

/// Configuration for the gateway service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    pub listen_addr: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl GatewayConfig {
    const DEFAULT_LISTEN_ADDR: &'static str = "0.0.0.0:8080";
    const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024; // 1 MiB
    const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Load from the process environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSetting`] for a numeric key that is not a positive integer.
    pub fn from_env() -> Result<Self, InvalidSetting> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSetting`] for a numeric key that is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InvalidSetting> {
        let mut config = Self::default();

        if let Some(addr) = lookup(LISTEN_ADDR).filter(|v| !v.trim().is_empty()) {
            config.listen_addr = addr.trim().to_string();
        }
        if let Some(value) = lookup(REQUEST_TIMEOUT_SECONDS) {
            config.request_timeout_seconds = parse_positive(REQUEST_TIMEOUT_SECONDS, &value)?;
        }
        if let Some(value) = lookup(MAX_BODY_BYTES) {
            config.max_body_bytes = parse_positive(MAX_BODY_BYTES, &value)?;
        }

        Ok(config)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::DEFAULT_LISTEN_ADDR.to_string(),
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
            request_timeout_seconds: Self::DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, InvalidSetting>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(InvalidSetting {
            key,
            value: value.to_string(),
        }),
    }
}

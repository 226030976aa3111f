//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use roster_auth::{CorsSettings, JwtService, RefreshCookiePolicy, SecurityServices, TokenVerifier};

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// Generic over the verifier so tests and dev builds can swap in a mock.
pub struct GatewayState<V>
where
    V: TokenVerifier,
{
    /// Bearer token verifier.
    pub verifier: Arc<V>,
    /// Refresh cookie attributes.
    pub cookie_policy: RefreshCookiePolicy,
    /// Allowed CORS origins.
    pub cors: CorsSettings,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<V> GatewayState<V>
where
    V: TokenVerifier,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(
        verifier: Arc<V>,
        cookie_policy: RefreshCookiePolicy,
        cors: CorsSettings,
        config: GatewayConfig,
    ) -> Self {
        Self {
            verifier,
            cookie_policy,
            cors,
            config,
        }
    }
}

impl GatewayState<JwtService> {
    /// Build the production state from the security services.
    #[must_use]
    pub fn from_services(services: &SecurityServices, config: GatewayConfig) -> Self {
        Self::new(
            Arc::new(services.jwt.clone()),
            services.cookie_policy.clone(),
            services.config.cors.clone(),
            config,
        )
    }
}

impl<V> Clone for GatewayState<V>
where
    V: TokenVerifier,
{
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            cookie_policy: self.cookie_policy.clone(),
            cors: self.cors.clone(),
            config: self.config.clone(),
        }
    }
}

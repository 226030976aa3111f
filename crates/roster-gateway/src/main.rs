//! Roster Gateway - HTTP entry point for the security core.
//!
//! Reads the security settings (`JWT_*`, `ACCESS_TOKEN_EXPIRED_MINUTES`,
//! `REFRESH_*`, `CORS_ALLOW_ORIGINS`) and the server settings (`LISTEN_ADDR`,
//! `REQUEST_TIMEOUT_SECONDS`, `MAX_BODY_BYTES`) from the environment. Any
//! invalid setting aborts startup before a socket is bound.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to verify bearer tokens with a mock
//! verifier. Use tokens in format: `test-token:<subject>:<roles>:<permissions>`

use std::process::ExitCode;
#[cfg(feature = "dev-mode")]
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "dev-mode")]
use roster_auth::MockTokenVerifier;
use roster_auth::SecurityServices;
use roster_gateway::{create_router, GatewayConfig, GatewayState};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,roster=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Roster Gateway");

    let services = match SecurityServices::from_env() {
        Ok(services) => services,
        Err(err) => {
            tracing::error!(error = %err, "Refusing to start with invalid security configuration");
            return ExitCode::FAILURE;
        }
    };

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Refusing to start with invalid gateway configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        listen_addr = %config.listen_addr,
        request_timeout_seconds = config.request_timeout_seconds,
        max_body_bytes = config.max_body_bytes,
        "Gateway configuration loaded"
    );

    let listen_addr = config.listen_addr.clone();

    #[cfg(feature = "dev-mode")]
    let state = {
        tracing::warn!("DEV MODE ENABLED - using mock token verifier");
        tracing::warn!("Use tokens in format: test-token:<subject>:<roles>:<permissions>");
        GatewayState::new(
            Arc::new(MockTokenVerifier),
            services.cookie_policy.clone(),
            services.config.cors.clone(),
            config,
        )
    };

    #[cfg(not(feature = "dev-mode"))]
    let state = GatewayState::from_services(&services, config);

    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, listen_addr = %listen_addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "Server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

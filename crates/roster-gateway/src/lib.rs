//! HTTP gateway for the roster security core.
//!
//! This crate puts the security core in front of real HTTP traffic:
//!
//! - Bearer token verification once per request, stored as a `TokenContext`
//! - The `AuthUser` extractor for protected handlers
//! - Refresh cookie clearing on logout
//! - CORS, body limits, timeouts and request ids
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Clients                              │
//! │                         (HTTP)                              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     roster-gateway                          │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Request id │ │ Token ctx   │ │  Router + Handlers  │    │
//! │  │  + tracing  │ │ middleware  │ │  (AuthUser)         │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌──────────────┐
//!                       │ roster-auth  │
//!                       └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use roster_auth::SecurityServices;
//! use roster_gateway::{create_router, GatewayConfig, GatewayState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let services = SecurityServices::from_env()?;
//! let config = GatewayConfig::from_env()?;
//! let listen_addr = config.listen_addr.clone();
//!
//! let state = GatewayState::from_services(&services, config);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind(listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{GatewayConfig, InvalidSetting};
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::AuthUser;

//! HTTP server: scheduling, instant meetings, consent callback.
//!
//! This crate exposes the quickmeet HTTP API over axum:
//! - `POST /api/schedule-meeting` and `POST /api/instant-meet`
//! - `GET /api/auth/status`, `GET /api/auth/start` and `GET /oauth2callback`
//!   for the consent flow
//! - `GET /health`
//!
//! Handlers share one [`MeetingProvider`](quickmeet_providers::MeetingProvider)
//! through [`AppState`].
//!
//! # Example
//!
//! ```rust,no_run
//! use quickmeet_server::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     serve(config).await?;
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod routes;
mod server;
mod signals;
mod state;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
pub use error::{ApiError, INVALID_BODY, ServerError, ServerResult};
pub use server::{app, build_provider, serve, serve_with_shutdown};
pub use signals::{ShutdownSignal, SignalHandler};
pub use state::{AppState, SharedState};

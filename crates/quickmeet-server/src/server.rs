//! Router assembly and the listener loop.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use quickmeet_protocol::paths;
use quickmeet_providers::google::{GoogleMeetProvider, PROVIDER_NAME};
use quickmeet_providers::{ErrorProvider, MeetingProvider};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::routes;
use crate::signals::SignalHandler;
use crate::state::{AppState, SharedState};

/// Builds the application router.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .nest("/api", routes::api_router())
        .route(paths::OAUTH_CALLBACK, get(routes::oauth_callback))
        .route(paths::HEALTH, get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the Google provider for `config`.
///
/// A provider that cannot be built is replaced by an [`ErrorProvider`], so
/// the server still answers and reports the problem on every call.
pub fn build_provider(config: &ServerConfig) -> Arc<dyn MeetingProvider> {
    match GoogleMeetProvider::new(config.to_google_config()) {
        Ok(provider) => Arc::new(provider),
        Err(err) => {
            error!("cannot initialize provider: {err}");
            Arc::new(ErrorProvider::new(PROVIDER_NAME, err))
        }
    }
}

/// Runs the server until SIGINT or SIGTERM.
pub async fn serve(config: ServerConfig) -> ServerResult<()> {
    let state = Arc::new(AppState::new(build_provider(&config), config.redirect_uri()));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| ServerError::bind(&addr, err))?;

    let signals = SignalHandler::new();
    signals.spawn_listener();

    info!(
        addr = %listener.local_addr()?,
        redirect_uri = %config.redirect_uri(),
        "quickmeet server listening"
    );
    serve_with_shutdown(listener, state, signals.shutdown().wait()).await
}

/// Serves `state` on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: SharedState,
    shutdown: F,
) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

//! Router construction and the listen loop.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{MethodRouter, any};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use super::handlers;
use super::instrument::{Instrumented, instrument};
use super::AppState;
use crate::domain::Endpoint;

/// Path of the uninstrumented scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

/// Listener failures. Both are fatal to the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server terminated: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the router: one exact-match route per [`Endpoint`], each
/// wrapped in instrumentation, plus the bare `/metrics` route. Any HTTP
/// method is accepted; unknown paths get axum's plain 404.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new();
    for endpoint in Endpoint::ALL {
        let route = instrumented(handler_for(endpoint), &state, endpoint);
        router = router.route(endpoint.path(), route);
    }
    router
        .route(METRICS_PATH, any(handlers::metrics))
        .with_state(state)
}

fn handler_for(endpoint: Endpoint) -> MethodRouter<AppState> {
    match endpoint {
        Endpoint::Stable => any(handlers::stable),
        Endpoint::FastRandom => any(handlers::fast_random),
        Endpoint::SlowRandom => any(handlers::slow_random),
        Endpoint::Summary => any(handlers::summary),
        Endpoint::NotFound => any(handlers::not_found),
        Endpoint::InternalError => any(handlers::internal_error),
    }
}

fn instrumented(route: MethodRouter<AppState>, state: &AppState, endpoint: Endpoint) -> MethodRouter<AppState> {
    let inst = Instrumented::new(state.metrics.clone(), endpoint.route_spec());
    route.layer(from_fn_with_state(inst, instrument))
}

/// Bind the TCP listener.
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
        addr: addr.to_owned(),
        source,
    })
}

/// Serve until the listener fails. There is no graceful shutdown.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "HTTP server started");
    }
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}

//! Endpoint handlers.
//!
//! Each one answers with the fixed status and body of its [`Endpoint`].
//! They are infallible; failures are only ever simulated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::AppState;
use crate::domain::Endpoint;

/// `/`: writes only a body, so the status is the implicit 200.
pub async fn stable() -> &'static str {
    Endpoint::Stable.body()
}

/// `/fast-random`: 200 after a delay in `[0, bounds.fast)`.
pub async fn fast_random(State(state): State<AppState>) -> impl IntoResponse {
    delayed(&state, Endpoint::FastRandom).await
}

/// `/slow-random`: 200 after a delay in `[0, bounds.slow)`.
pub async fn slow_random(State(state): State<AppState>) -> impl IntoResponse {
    delayed(&state, Endpoint::SlowRandom).await
}

/// `/summary`: same behavior as `/fast-random`; only the route's
/// instrumentation differs.
pub async fn summary(State(state): State<AppState>) -> impl IntoResponse {
    delayed(&state, Endpoint::Summary).await
}

/// `/error`: simulated 404 with an empty body.
pub async fn not_found() -> StatusCode {
    status_of(Endpoint::NotFound)
}

/// `/internal-error`: simulated 500 with an empty body.
pub async fn internal_error() -> StatusCode {
    status_of(Endpoint::InternalError)
}

/// `/metrics`: text exposition of the registry.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn delayed(state: &AppState, endpoint: Endpoint) -> (StatusCode, &'static str) {
    if let Some(max) = endpoint.delay_bound(&state.bounds) {
        state.pause(max).await;
    }
    (status_of(endpoint), endpoint.body())
}

/// The endpoint's fixed status. The endpoint table only holds valid codes.
fn status_of(endpoint: Endpoint) -> StatusCode {
    StatusCode::from_u16(endpoint.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

//! Instrumentation middleware.
//!
//! Wraps a route so that every finished request is counted once and its
//! wall-clock duration observed into the route's sink. The response is
//! passed through untouched.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::RouteSpec;

/// Per-route middleware state: the shared registry and the route's
/// fixed labels.
#[derive(Clone)]
pub struct Instrumented {
    metrics: Arc<MetricsRegistry>,
    route: RouteSpec,
}

impl Instrumented {
    /// Middleware state for one route.
    pub fn new(metrics: Arc<MetricsRegistry>, route: RouteSpec) -> Self {
        Self { metrics, route }
    }
}

/// Use with `axum::middleware::from_fn_with_state`.
///
/// The status code is read from the finished response, so handlers that
/// only write a body are attributed the default 200.
pub async fn instrument(State(inst): State<Instrumented>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed().as_secs_f64();
    let status = response.status();
    inst.metrics
        .record_request(&inst.route, method.as_str(), status.as_str(), elapsed);

    debug!(
        method = %method,
        endpoint = inst.route.endpoint,
        status = status.as_u16(),
        elapsed_secs = elapsed,
        "Request instrumented"
    );

    response
}

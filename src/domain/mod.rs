//! Domain layer - Endpoint behavior and quantile estimation.
//!
//! Pure logic with no I/O: the fixed behavior of each synthetic endpoint
//! and the streaming quantile estimator backing the duration summary.

pub mod endpoint;
pub mod quantile;

pub use endpoint::{DelayBounds, DurationSink, Endpoint, RouteSpec};
pub use quantile::{Objective, QuantileSnapshot, QuantileStream, WindowedQuantiles};

//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Concrete infrastructure behind the ports and the HTTP surface.
//!
//! Adapter categories:
//! - `delay`: seeded random delay source
//! - `http`: axum router, handlers and instrumentation middleware
//! - `metrics`: Prometheus registry and summary collector

pub mod delay;
pub mod http;
pub mod metrics;

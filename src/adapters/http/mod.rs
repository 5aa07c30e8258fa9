//! HTTP Adapter - Router, Handlers and Instrumentation
//!
//! Serves the synthetic endpoints and `/metrics` via axum 0.7. Every
//! synthetic route is wrapped in the instrumentation middleware; the
//! scrape route is not.

pub mod handlers;
pub mod instrument;
pub mod server;
pub mod state;

pub use instrument::Instrumented;
pub use server::{ServerError, bind, create_router, serve};
pub use state::AppState;

//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the HTTP layer requires from the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `DelaySource`: artificial latency for the random endpoints

pub mod delay;

pub use delay::DelaySource;

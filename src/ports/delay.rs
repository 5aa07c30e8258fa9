//! Delay Source Port - Artificial Latency Interface
//!
//! The random-delay endpoints ask this port how long to wait. The
//! production adapter draws from a shared seeded generator; tests plug
//! in deterministic sources.

use std::time::Duration;

/// Source of artificial response delays.
///
/// Shared by every request task, so implementations must be safe to
/// call concurrently.
pub trait DelaySource: Send + Sync + 'static {
  /// Draw a delay uniformly from `[0, max)`.
  ///
  /// A zero `max` yields a zero delay.
  fn draw(&self, max: Duration) -> Duration;
}

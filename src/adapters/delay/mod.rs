//! Seeded Delay Adapter - Process-wide Random Latency
//!
//! One pseudo-random generator, seeded from the wall clock at startup
//! and shared by all request tasks behind a mutex that is held only
//! long enough to draw a number.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::ports::DelaySource;

/// [`DelaySource`] drawing whole milliseconds from a seeded `StdRng`.
#[derive(Debug)]
pub struct SeededDelay {
    rng: Mutex<StdRng>,
}

impl SeededDelay {
    /// Seed from the current time. No reproducibility across runs.
    pub fn from_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));
        debug!(seed, "Seeded delay generator");
        Self::with_seed(seed)
    }

    /// Deterministic generator, for tests and benchmarks.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DelaySource for SeededDelay {
    fn draw(&self, max: Duration) -> Duration {
        let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        if max_ms == 0 {
            return Duration::ZERO;
        }
        let ms = self.rng.lock().gen_range(0..max_ms);
        Duration::from_millis(ms)
    }
}

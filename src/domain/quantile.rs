//! Streaming quantiles with a bounded rank error.
//!
//! [`QuantileStream`] is a Greenwald-Khanna summary. Each kept sample
//! carries `g` (its minimum rank minus the previous sample's) and
//! `delta` (the spread between its minimum and maximum rank). Two
//! invariants hold at all times:
//!
//! - the true rank of sample `i` lies in `[rmin(i), rmin(i) + delta(i)]`;
//! - `g(i) + delta(i) <= max(1, 2 * eps * n)` for every sample but the
//!   first, where `eps` is the tightest objective error.
//!
//! Together they guarantee every query answers with a value whose rank
//! is within `eps * n` of the requested one, for every objective at once.
//! The smallest and largest observations are always kept exactly.
//!
//! [`WindowedQuantiles`] layers a sliding time window on top: every
//! observation goes into all age-bucket streams, queries read the oldest
//! live one, and streams are reset as they expire.

use std::time::{Duration, Instant};

/// Inserts between two compression passes.
const COMPRESS_INTERVAL: u64 = 128;

/// A target quantile with its tolerated rank error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    /// Quantile in (0, 1).
    pub quantile: f64,
    /// Absolute rank error, as a fraction of the sample count.
    pub error: f64,
}

impl Objective {
    /// Target `quantile` answered within `error * n` ranks.
    pub const fn new(quantile: f64, error: f64) -> Self {
        Self { quantile, error }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    value: f64,
    g: u64,
    delta: u64,
}

#[allow(clippy::cast_precision_loss, reason = "sample counts stay far below 2^52")]
const fn to_f64(n: u64) -> f64 {
    n as f64
}

/// Greenwald-Khanna stream bounded by the tightest of its objectives.
#[derive(Debug, Clone)]
pub struct QuantileStream {
    eps: f64,
    samples: Vec<Sample>,
    n: u64,
    since_compress: u64,
}

impl QuantileStream {
    /// Stream whose rank error is the smallest `error` among `objectives`.
    ///
    /// With no objectives, or a zero error, every observation is kept.
    pub fn new(objectives: &[Objective]) -> Self {
        let eps = objectives
            .iter()
            .map(|o| o.error)
            .fold(f64::INFINITY, f64::min);
        Self {
            eps: if eps.is_finite() { eps.max(0.0) } else { 0.0 },
            samples: Vec::new(),
            n: 0,
            since_compress: 0,
        }
    }

    /// Add one observation.
    pub fn insert(&mut self, value: f64) {
        // Equal values go after the ones already kept.
        let i = self.samples.partition_point(|s| s.value <= value);
        let delta = if i == 0 || i == self.samples.len() {
            0
        } else {
            let next = self.samples[i];
            next.g + next.delta - 1
        };
        self.samples.insert(i, Sample { value, g: 1, delta });
        self.n += 1;

        self.since_compress += 1;
        if self.since_compress >= COMPRESS_INTERVAL {
            self.compress();
        }
    }

    /// Number of observations seen since the last reset.
    pub const fn count(&self) -> u64 {
        self.n
    }

    /// Drop every observation.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.n = 0;
        self.since_compress = 0;
    }

    /// Estimate quantile `q`, or `None` when the stream is empty.
    pub fn query(&self, q: f64) -> Option<f64> {
        let last = self.samples.last()?;
        let n = to_f64(self.n);
        let target = (q * n).ceil().clamp(1.0, n);
        let bound = target + self.eps * n;

        let mut rmin = 0;
        for (i, s) in self.samples.iter().enumerate() {
            rmin += s.g;
            if to_f64(rmin + s.delta) > bound {
                // The first sample always has rank 1 <= target.
                return Some(self.samples[i.saturating_sub(1)].value);
            }
        }
        Some(last.value)
    }

    /// Merge neighbours while the error invariant allows it. The first
    /// and last samples are never merged away.
    fn compress(&mut self) {
        self.since_compress = 0;
        let len = self.samples.len();
        if len < 3 {
            return;
        }
        let threshold = (2.0 * self.eps * to_f64(self.n)).floor();

        let mut kept: Vec<Sample> = Vec::with_capacity(len);
        let mut head = self.samples[len - 1];
        for &cur in self.samples[1..len - 1].iter().rev() {
            if to_f64(cur.g + head.g + head.delta) <= threshold {
                head.g += cur.g;
            } else {
                kept.push(head);
                head = cur;
            }
        }
        kept.push(head);
        kept.push(self.samples[0]);
        kept.reverse();
        self.samples = kept;
    }
}

/// Point-in-time view of a windowed stream.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSnapshot {
    /// `(quantile, estimate)` per objective, ascending; NaN when the
    /// window holds no observations.
    pub quantiles: Vec<(f64, f64)>,
    /// Observations since creation (not windowed).
    pub count: u64,
    /// Sum of observations since creation (not windowed).
    pub sum: f64,
}

/// Quantiles over a sliding window of `max_age`, split in age buckets.
#[derive(Debug, Clone)]
pub struct WindowedQuantiles {
    objectives: Vec<Objective>,
    streams: Vec<QuantileStream>,
    head: usize,
    head_expires: Instant,
    stream_duration: Duration,
    max_age: Duration,
    count: u64,
    sum: f64,
}

impl WindowedQuantiles {
    /// `age_buckets` is clamped to at least one.
    pub fn new(objectives: &[Objective], max_age: Duration, age_buckets: u32, now: Instant) -> Self {
        let age_buckets = age_buckets.max(1);
        let mut objectives = objectives.to_vec();
        objectives.sort_by(|a, b| a.quantile.total_cmp(&b.quantile));
        let stream_duration = max_age / age_buckets;
        Self {
            streams: (0..age_buckets)
                .map(|_| QuantileStream::new(&objectives))
                .collect(),
            objectives,
            head: 0,
            head_expires: now + stream_duration,
            stream_duration,
            max_age,
            count: 0,
            sum: 0.0,
        }
    }

    /// Record `value` observed at `now`.
    pub fn observe_at(&mut self, value: f64, now: Instant) {
        self.rotate(now);
        for stream in &mut self.streams {
            stream.insert(value);
        }
        self.count += 1;
        self.sum += value;
    }

    /// Quantile estimates for the window ending at `now`, plus the
    /// cumulative count and sum.
    pub fn snapshot_at(&mut self, now: Instant) -> QuantileSnapshot {
        self.rotate(now);
        let head = &self.streams[self.head];
        let quantiles = self
            .objectives
            .iter()
            .map(|o| (o.quantile, head.query(o.quantile).unwrap_or(f64::NAN)))
            .collect();
        QuantileSnapshot {
            quantiles,
            count: self.count,
            sum: self.sum,
        }
    }

    fn rotate(&mut self, now: Instant) {
        if self.stream_duration.is_zero() {
            return;
        }
        if now.saturating_duration_since(self.head_expires) >= self.max_age {
            // Idle for a whole window: everything has expired.
            for stream in &mut self.streams {
                stream.reset();
            }
            self.head_expires = now + self.stream_duration;
            return;
        }
        while now >= self.head_expires {
            self.streams[self.head].reset();
            self.head = (self.head + 1) % self.streams.len();
            self.head_expires += self.stream_duration;
        }
    }
}

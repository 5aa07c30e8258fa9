//! Summary Vector - Prometheus Summary Collector
//!
//! The `prometheus` crate ships counters, gauges and histograms but no
//! summary, so this module provides a labeled summary as a custom
//! [`Collector`]. Each label combination owns a [`WindowedQuantiles`]
//! behind its own mutex; scrapes lock one series at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use prometheus::core::{Collector, Desc};
use prometheus::proto::{self, LabelPair, Metric, MetricFamily, MetricType};

use super::MetricsError;
use crate::domain::{Objective, WindowedQuantiles};

/// Default sliding window, matching the Prometheus client default.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);
/// Default number of age buckets in the window.
pub const DEFAULT_AGE_BUCKETS: u32 = 5;

/// Options for a [`SummaryVec`].
#[derive(Debug, Clone)]
pub struct SummaryOpts {
    pub name: String,
    pub help: String,
    pub objectives: Vec<Objective>,
    pub max_age: Duration,
    pub age_buckets: u32,
}

impl SummaryOpts {
    /// Options with no objectives and the default window.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, help: S2) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            objectives: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            age_buckets: DEFAULT_AGE_BUCKETS,
        }
    }

    /// Quantiles to report, each with its tolerated rank error.
    #[must_use]
    pub fn objectives(mut self, objectives: Vec<Objective>) -> Self {
        self.objectives = objectives;
        self
    }

    /// Length of the sliding window quantiles are computed over.
    #[must_use]
    pub const fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Number of streams the window rotates through.
    #[must_use]
    pub const fn age_buckets(mut self, age_buckets: u32) -> Self {
        self.age_buckets = age_buckets;
        self
    }
}

type Series = Arc<Mutex<WindowedQuantiles>>;

#[derive(Debug)]
struct SummaryCore {
    desc: Desc,
    opts: SummaryOpts,
    series: RwLock<HashMap<Vec<String>, Series>>,
}

/// Labeled summary with sliding-window quantile estimates.
///
/// Cheap to clone; clones share the same series.
#[derive(Debug, Clone)]
pub struct SummaryVec {
    core: Arc<SummaryCore>,
}

/// One label combination of a [`SummaryVec`].
#[derive(Debug, Clone)]
pub struct Summary {
    series: Series,
}

impl Summary {
    /// Record one observation at the current time.
    pub fn observe(&self, value: f64) {
        self.series.lock().observe_at(value, Instant::now());
    }
}

impl SummaryVec {
    /// Build a summary vector. Objectives must lie in (0, 1) with an
    /// error in [0, 1).
    pub fn new(opts: SummaryOpts, label_names: &[&str]) -> Result<Self, MetricsError> {
        for o in &opts.objectives {
            if !(o.quantile > 0.0 && o.quantile < 1.0) {
                return Err(MetricsError::InvalidObjective {
                    quantile: o.quantile,
                    reason: "quantile must lie in (0, 1)",
                });
            }
            if !(0.0..1.0).contains(&o.error) {
                return Err(MetricsError::InvalidObjective {
                    quantile: o.quantile,
                    reason: "error must lie in [0, 1)",
                });
            }
        }
        if label_names.contains(&"quantile") {
            return Err(MetricsError::ReservedLabel("quantile"));
        }

        let desc = Desc::new(
            opts.name.clone(),
            opts.help.clone(),
            label_names.iter().map(|l| (*l).to_owned()).collect(),
            HashMap::new(),
        )?;

        Ok(Self {
            core: Arc::new(SummaryCore {
                desc,
                opts,
                series: RwLock::new(HashMap::new()),
            }),
        })
    }

    /// Get or create the series for `values`, given in label-name order.
    pub fn get_metric_with_label_values(&self, values: &[&str]) -> Result<Summary, MetricsError> {
        let expected = self.core.desc.variable_labels.len();
        if values.len() != expected {
            return Err(MetricsError::LabelCardinality {
                expected,
                got: values.len(),
            });
        }
        let key: Vec<String> = values.iter().map(|v| (*v).to_owned()).collect();

        if let Some(series) = self.core.series.read().get(&key) {
            return Ok(Summary {
                series: Arc::clone(series),
            });
        }

        let mut map = self.core.series.write();
        let series = map.entry(key).or_insert_with(|| {
            Arc::new(Mutex::new(WindowedQuantiles::new(
                &self.core.opts.objectives,
                self.core.opts.max_age,
                self.core.opts.age_buckets,
                Instant::now(),
            )))
        });
        Ok(Summary {
            series: Arc::clone(series),
        })
    }

    fn metric_for(&self, values: &[String], series: &Series) -> Metric {
        let snapshot = series.lock().snapshot_at(Instant::now());

        let mut labels: Vec<LabelPair> = self
            .core
            .desc
            .variable_labels
            .iter()
            .zip(values)
            .map(|(name, value)| {
                let mut pair = LabelPair::default();
                pair.set_name(name.clone());
                pair.set_value(value.clone());
                pair
            })
            .collect();
        labels.sort_by(|a, b| a.get_name().cmp(b.get_name()));

        let quantiles: Vec<proto::Quantile> = snapshot
            .quantiles
            .iter()
            .map(|&(q, v)| {
                let mut quantile = proto::Quantile::default();
                quantile.set_quantile(q);
                quantile.set_value(v);
                quantile
            })
            .collect();

        let mut summary = proto::Summary::default();
        summary.set_sample_count(snapshot.count);
        summary.set_sample_sum(snapshot.sum);
        summary.set_quantile(quantiles.into());

        let mut metric = Metric::default();
        metric.set_label(labels.into());
        metric.set_summary(summary);
        metric
    }
}

impl Collector for SummaryVec {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.core.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        // Clone the handles so the map lock is not held while each series
        // computes its quantiles.
        let mut entries: Vec<(Vec<String>, Series)> = self
            .core
            .series
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let metrics: Vec<Metric> = entries
            .iter()
            .map(|(values, series)| self.metric_for(values, series))
            .collect();

        let mut family = MetricFamily::default();
        family.set_name(self.core.desc.fq_name.clone());
        family.set_help(self.core.desc.help.clone());
        family.set_field_type(MetricType::SUMMARY);
        family.set_metric(metrics.into());
        vec![family]
    }
}

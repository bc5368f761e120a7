//! The aggregated telemetry a host hands over on every flush.
//!
//! The shapes mirror the statsd flush snapshot: counters map a dotted name to
//! a number, timers map a name to the raw samples of the interval and timer
//! data maps a name to its computed statistics. Keys the backend has no use
//! for, gauges or sets for instance, are ignored on the way in.

use error::Error;
use serde_json;
use std::collections::BTreeMap;

/// A single statistic computed for a timer.
///
/// Most statistics are plain numbers. statsd additionally nests a histogram
/// of `bin_<bound>` counts under the `histogram` key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimerStat {
    /// A scalar statistic such as `mean` or `upper_90`.
    Value(f64),
    /// Bin name to count.
    Histogram(BTreeMap<String, f64>),
}

/// A snapshot of aggregated metrics for one flush interval.
///
/// Produced fresh by the host each cycle and never retained by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// Dotted metric name to counter value.
    #[serde(default)]
    pub counters: BTreeMap<String, f64>,
    /// Dotted metric name to the timer samples of the interval.
    #[serde(default)]
    pub timers: BTreeMap<String, Vec<f64>>,
    /// Dotted metric name to computed timer statistics.
    #[serde(default)]
    pub timer_data: BTreeMap<String, BTreeMap<String, TimerStat>>,
}

impl MetricSnapshot {
    /// Make an empty snapshot.
    pub fn new() -> MetricSnapshot {
        MetricSnapshot::default()
    }

    /// Add or replace a counter.
    ///
    /// # Examples
    ///
    /// ```
    /// use statsd_elastic::metric::MetricSnapshot;
    ///
    /// let snap = MetricSnapshot::new().counter("app.requests", 5.0);
    ///
    /// assert_eq!(snap.counters.get("app.requests"), Some(&5.0));
    /// ```
    pub fn counter<S>(mut self, name: S, value: f64) -> MetricSnapshot
    where
        S: Into<String>,
    {
        self.counters.insert(name.into(), value);
        self
    }

    /// Add or replace the samples of a timer.
    pub fn timer<S>(mut self, name: S, samples: Vec<f64>) -> MetricSnapshot
    where
        S: Into<String>,
    {
        self.timers.insert(name.into(), samples);
        self
    }

    /// Add or replace the statistics of a timer.
    pub fn timer_data<S>(
        mut self,
        name: S,
        stats: BTreeMap<String, TimerStat>,
    ) -> MetricSnapshot
    where
        S: Into<String>,
    {
        self.timer_data.insert(name.into(), stats);
        self
    }

    /// Total number of named metrics across all categories.
    pub fn len(&self) -> usize {
        self.counters.len() + self.timers.len() + self.timer_data.len()
    }

    /// True when the snapshot holds no metrics at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A flush request: the host's flush time in epoch seconds plus the
/// snapshot to ship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlushEvent {
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// The metrics of the interval.
    #[serde(default)]
    pub metrics: MetricSnapshot,
}

impl FlushEvent {
    /// Parse a flush event from its JSON representation.
    pub fn from_json(line: &str) -> Result<FlushEvent, Error> {
        Ok(serde_json::from_str(line)?)
    }
}

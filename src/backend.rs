//! The interface a host drives.

use error::Error;
use metric::MetricSnapshot;
use transmit::Delivery;

/// A 'backend' is a sink for flushed metrics.
///
/// The host owns the flush cadence. It calls `flush` once per interval with
/// the interval's snapshot and `status` whenever it is asked for health.
pub trait Backend {
    /// Ship `metrics`, stamped with `timestamp` in epoch seconds.
    ///
    /// Returns as soon as the request is under way. The returned `Delivery`
    /// may be waited on for the outcome or dropped.
    fn flush(&mut self, timestamp: i64, metrics: &MetricSnapshot) -> Result<Delivery, Error>;

    /// Report each tracked stat as `(error, source, name, value)`.
    fn status(&self, write: &mut dyn FnMut(Option<&Error>, &str, &str, i64));
}

//! Export state reported back to the host.
//!
//! Two timestamps, both seeded with the host's startup time. `last_flush` is
//! never moved by a flush. `last_exception` moves whenever a bulk request
//! fails to reach Elasticsearch or is dropped for lack of capacity.

use error::Error;
use std::sync::atomic::{AtomicI64, Ordering};

/// Name every status line is reported under.
pub const SOURCE: &'static str = "elastic";

/// Timestamps shared between a backend and its delivery threads.
#[derive(Debug)]
pub struct ExportState {
    last_flush: AtomicI64,
    last_exception: AtomicI64,
}

impl ExportState {
    /// Seed both timestamps with `startup_time`, in epoch seconds.
    pub fn new(startup_time: i64) -> ExportState {
        ExportState {
            last_flush: AtomicI64::new(startup_time),
            last_exception: AtomicI64::new(startup_time),
        }
    }

    /// Epoch seconds of the last recorded flush.
    pub fn last_flush(&self) -> i64 {
        self.last_flush.load(Ordering::Relaxed)
    }

    /// Epoch seconds of the last delivery failure.
    pub fn last_exception(&self) -> i64 {
        self.last_exception.load(Ordering::Relaxed)
    }

    /// Note a delivery failure at `time`. Earlier times never overwrite
    /// later ones.
    pub fn record_exception(&self, time: i64) {
        self.last_exception.fetch_max(time, Ordering::Relaxed);
    }

    /// The reportable stats, in reporting order.
    pub fn stats(&self) -> [(&'static str, i64); 2] {
        [
            ("last_flush", self.last_flush()),
            ("last_exception", self.last_exception()),
        ]
    }
}

/// Call `write` once per stat with no error and `SOURCE` as the source.
pub fn report(state: &ExportState, write: &mut dyn FnMut(Option<&Error>, &str, &str, i64)) {
    for &(name, value) in &state.stats() {
        write(None, SOURCE, name, value);
    }
}

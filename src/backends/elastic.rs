//! `Elasticsearch` is a document indexing engine.
//!
//! This backend turns every flushed counter into a document and writes the
//! lot to a daily index with one bulk request per flush.

use backend::Backend;
use bulk::{self, DocumentTypes};
use document;
use error::Error;
use metric::MetricSnapshot;
use serde_json;
use status::{self, ExportState};
use std::sync::Arc;
use std::time::Duration;
use time;
use transmit::{Delivery, Reply, Transmitter};

/// Configuration for the Elasticsearch backend
#[derive(Debug, Clone)]
pub struct ElasticConfig {
    /// The Elasticsearch host. May be an IP address or DNS hostname.
    pub host: String,
    /// The Elasticsearch port.
    pub port: u16,
    /// The HTTP path Elasticsearch is served under. Must end in `/`.
    pub path: String,
    /// Prefix of the daily index, `<prefix>-YYYY.MM.DD`.
    pub index_prefix: String,
    /// Document type per metric category.
    pub types: DocumentTypes,
    /// Log every outgoing bulk body and a per-flush summary.
    pub debug: bool,
    /// Export timer samples and timer statistics in addition to counters.
    pub export_timers: bool,
    /// Maximum bulk requests outstanding at once.
    pub max_in_flight: usize,
    /// Socket read and write timeout in seconds, if any.
    pub timeout: Option<u64>,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        ElasticConfig {
            host: "localhost".to_string(),
            port: 9200,
            path: "/".to_string(),
            index_prefix: "statsd".to_string(),
            types: DocumentTypes::default(),
            debug: false,
            export_timers: false,
            max_in_flight: 8,
            timeout: None,
        }
    }
}

/// The Elasticsearch backend.
///
/// Refer to the documentation on `ElasticConfig` for more details.
#[derive(Debug)]
pub struct Elastic {
    path: String,
    index_prefix: String,
    types: DocumentTypes,
    debug: bool,
    export_timers: bool,
    transmitter: Transmitter,
    state: Arc<ExportState>,
}

impl Elastic {
    /// Construct a new Elastic backend.
    ///
    /// `startup_time` seeds the reported status stats, in epoch seconds.
    pub fn init(startup_time: i64, config: ElasticConfig) -> Elastic {
        let timeout = config.timeout.map(Duration::from_secs);
        Elastic {
            transmitter: Transmitter::new(
                &config.host,
                config.port,
                timeout,
                config.max_in_flight,
            ),
            path: config.path,
            index_prefix: config.index_prefix,
            types: config.types,
            debug: config.debug,
            export_timers: config.export_timers,
            state: Arc::new(ExportState::new(startup_time)),
        }
    }

    /// The export state reported through `status`.
    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// Today's index, by the UTC wall clock.
    pub fn index(&self) -> String {
        bulk::index_name(&self.index_prefix, &time::utc_now())
    }
}

fn complete(state: &ExportState, res: &Result<Reply, Error>) {
    match *res {
        Ok(ref reply) => match reply.error_line() {
            Some(line) => error!("{}", line),
            None => trace!("bulk request answered with {}", reply.status),
        },
        Err(ref err) => {
            state.record_exception(time::now());
            error!("Unable to write, delivery failure: {}", err);
        }
    }
}

impl Backend for Elastic {
    fn flush(&mut self, timestamp: i64, metrics: &MetricSnapshot) -> Result<Delivery, Error> {
        match serde_json::to_string(metrics) {
            Ok(json) => info!("{}", json),
            Err(err) => error!("Unable to render snapshot: {}", err),
        }

        let batch = document::build_batch(metrics, timestamp, self.export_timers);
        let index = self.index();
        let body = bulk::payload(&batch, &index, &self.types);
        if self.debug {
            debug!("{}", body);
        }

        let url = self.transmitter.bulk_url(&self.path, &index);
        let state = Arc::clone(&self.state);
        match self.transmitter.send(url, body, move |res| complete(&state, res)) {
            Ok(delivery) => {
                if self.debug {
                    debug!("flushed {} stats to ES", batch.len());
                }
                Ok(delivery)
            }
            Err(err) => {
                self.state.record_exception(time::now());
                error!("Unable to write: {}", err);
                Err(err)
            }
        }
    }

    fn status(&self, write: &mut dyn FnMut(Option<&Error>, &str, &str, i64)) {
        status::report(&self.state, write);
    }
}

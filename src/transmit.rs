//! Ship a bulk body to Elasticsearch.
//!
//! Every send happens on its own delivery thread so a slow or unreachable
//! cluster never stalls the host's flush cadence. The caller gets a
//! `Delivery` back and may wait on it or drop it. The number of deliveries
//! outstanding at once is capped; a send past the cap is refused rather than
//! queued.

use error::Error;
use hyper::client::Client;
use hyper::header::{ContentLength, ContentType};
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// What Elasticsearch said about a bulk request.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// Response body, lossily decoded.
    pub body: String,
}

impl Reply {
    /// True for any 5xx status.
    pub fn is_server_error(&self) -> bool {
        self.status / 100 == 5
    }

    /// The line to log for this reply, if any. Only server errors are
    /// reported.
    pub fn error_line(&self) -> Option<String> {
        if self.is_server_error() {
            Some(format!("HTTP {}: {}", self.status, self.body))
        } else {
            None
        }
    }
}

/// Handle on an in-flight bulk request.
#[derive(Debug)]
pub struct Delivery {
    handle: thread::JoinHandle<Result<Reply, Error>>,
}

impl Delivery {
    /// True once the request has completed, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the request completes.
    pub fn wait(self) -> Result<Reply, Error> {
        match self.handle.join() {
            Ok(res) => res,
            Err(_) => Err(Error::Lost),
        }
    }
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Performs bulk requests against a single Elasticsearch host.
#[derive(Debug)]
pub struct Transmitter {
    base: String,
    timeout: Option<Duration>,
    max_in_flight: usize,
    in_flight: Arc<AtomicUsize>,
}

impl Transmitter {
    /// Make a transmitter for `host:port`.
    ///
    /// `timeout` bounds socket reads and writes; `None` leaves the transport
    /// defaults in place. At most `max_in_flight` requests run at once.
    pub fn new(
        host: &str,
        port: u16,
        timeout: Option<Duration>,
        max_in_flight: usize,
    ) -> Transmitter {
        Transmitter {
            base: format!("http://{}:{}", host, port),
            timeout: timeout,
            max_in_flight: max_in_flight,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The bulk endpoint for `index` under the base `path`.
    pub fn bulk_url(&self, path: &str, index: &str) -> String {
        format!("{}{}{}/_bulk", self.base, path, index)
    }

    /// Number of requests currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<InFlight, Error> {
        let mut cur = self.in_flight.load(Ordering::Acquire);
        loop {
            if cur >= self.max_in_flight {
                return Err(Error::Saturated(self.max_in_flight));
            }
            match self.in_flight.compare_exchange(
                cur,
                cur + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(InFlight(Arc::clone(&self.in_flight))),
                Err(actual) => cur = actual,
            }
        }
    }

    /// POST `payload` to `url` on a fresh delivery thread.
    ///
    /// `on_complete` runs on the delivery thread with the outcome before the
    /// outcome is handed to whoever waits on the `Delivery`.
    pub fn send<F>(&self, url: String, payload: String, on_complete: F) -> Result<Delivery, Error>
    where
        F: FnOnce(&Result<Reply, Error>) + Send + 'static,
    {
        let slot = self.acquire()?;
        let timeout = self.timeout;
        let handle = thread::Builder::new()
            .name("elastic-delivery".to_string())
            .spawn(move || {
                let _slot = slot;
                let res = post(&url, &payload, timeout);
                on_complete(&res);
                res
            })?;
        Ok(Delivery { handle: handle })
    }
}

/// Perform one blocking bulk POST.
pub fn post(url: &str, payload: &str, timeout: Option<Duration>) -> Result<Reply, Error> {
    let mut client = Client::new();
    client.set_read_timeout(timeout);
    client.set_write_timeout(timeout);

    let mut res = client
        .post(url)
        .header(ContentType::json())
        .header(ContentLength(payload.len() as u64))
        .body(payload)
        .send()?;

    let mut body = Vec::new();
    res.read_to_end(&mut body)?;
    Ok(Reply {
        status: res.status.to_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

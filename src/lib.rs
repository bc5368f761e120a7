//! statsd-elastic is a flush backend for statsd-style aggregators. On every
//! flush the host hands it a snapshot of aggregated counters; the backend
//! turns each dotted metric name into a flat document and ships the lot to
//! Elasticsearch as a single bulk request.
//!
//! The moving parts:
//!
//!  * `document` derives documents from metric names.
//!  * `bulk` renders documents into the bulk-write wire format.
//!  * `transmit` performs the HTTP request off the caller's thread.
//!  * `status` tracks the two timestamps reported back to the host.
//!  * `backends::Elastic` ties these together behind the `Backend` trait.
#![allow(unknown_lints)]
#![deny(trivial_numeric_casts, missing_docs, unstable_features, unused_import_braces)]
extern crate chrono;
extern crate clap;
extern crate hyper;
extern crate serde;
#[macro_use]
extern crate serde_json;
extern crate toml;

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

#[cfg(test)]
extern crate quickcheck;

pub mod backend;
pub mod backends;
pub mod bulk;
pub mod config;
pub mod document;
pub mod error;
pub mod metric;
pub mod status;
pub mod time;
pub mod transmit;

pub use error::Error;

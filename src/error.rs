//! Crate-wide error type.

use hyper;
use serde_json;
use std::error;
use std::fmt;
use std::io;
use toml;

/// Everything that can go wrong while configuring the backend or shipping a
/// bulk request.
#[derive(Debug)]
pub enum Error {
    /// The HTTP client failed: connection refused, DNS, timeout and the like.
    Http(hyper::Error),
    /// Local I/O failure, reading a config file or a reply body.
    Io(io::Error),
    /// The configuration file is not valid TOML.
    Toml(toml::de::Error),
    /// A snapshot or flush event is not valid JSON.
    Json(serde_json::Error),
    /// A configuration key holds a value of the wrong type or range.
    Config(String),
    /// The number of outstanding bulk requests reached the configured cap.
    Saturated(usize),
    /// The delivery thread died before reporting an outcome.
    Lost,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Http(ref e) => write!(f, "http failure: {}", e),
            Error::Io(ref e) => write!(f, "io failure: {}", e),
            Error::Toml(ref e) => write!(f, "could not parse config file: {}", e),
            Error::Json(ref e) => write!(f, "could not parse json: {}", e),
            Error::Config(ref msg) => write!(f, "bad configuration: {}", msg),
            Error::Saturated(cap) => {
                write!(f, "{} bulk requests already in flight, dropping flush", cap)
            }
            Error::Lost => write!(f, "delivery thread exited without a result"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Http(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
            Error::Toml(ref e) => Some(e),
            Error::Json(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Error {
        Error::Http(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Error {
        Error::Toml(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

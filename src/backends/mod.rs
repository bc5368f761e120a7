//! Backends the host can flush into.

mod elastic;

pub use self::elastic::{Elastic, ElasticConfig};

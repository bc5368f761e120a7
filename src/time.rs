//! Wall-clock helpers.

use chrono::{DateTime, TimeZone, Utc};

/// Seconds since the Unix epoch, UTC.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// The current UTC instant.
pub fn utc_now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a flush timestamp in seconds to the milliseconds Elasticsearch
/// expects in `@timestamp`.
#[inline]
pub fn secs_to_ms(secs: i64) -> i64 {
    secs.saturating_mul(1000)
}

/// Build a UTC instant from epoch seconds, `None` when out of range.
pub fn from_secs(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_secs_to_ms() {
        assert_eq!(1_700_000_000_000, secs_to_ms(1_700_000_000));
        assert_eq!(0, secs_to_ms(0));
        assert_eq!(i64::max_value(), secs_to_ms(i64::max_value()));
    }

    #[test]
    fn test_from_secs() {
        let dt = from_secs(1_709_769_600).unwrap();
        assert_eq!((2024, 3, 7), (dt.year(), dt.month(), dt.day()));
    }
}

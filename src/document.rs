//! Turn a metrics snapshot into flat, indexable documents.
//!
//! A counter named `grove.customer.module.stat` becomes
//!
//! ```text
//! { stat: "stat", module: "module", customer: "customer", grove: "grove",
//!   value: <count>, @timestamp: <ms> }
//! ```
//!
//! The name is split on `.` and reversed, then zipped against a fixed list
//! of field names. statsd's own bookkeeping counters, those whose name
//! begins with `statsd.`, use the shorter `stat, process` list instead.

use metric::{MetricSnapshot, TimerStat};
use std::fmt;
use std::slice;
use time;

/// Field names for application counters, most specific first.
pub const GROVE_KEYS: [&'static str; 4] = ["stat", "module", "customer", "grove"];
/// Field names for statsd's internal counters.
pub const STATSD_KEYS: [&'static str; 2] = ["stat", "process"];

/// Field names for timer documents, in metric-name order.
const TIMER_KEYS: [&'static str; 4] = ["ns", "grp", "tgt", "act"];

/// A single document value.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// A metric name segment.
    Text(String),
    /// A metric value.
    Number(f64),
    /// A millisecond timestamp.
    Integer(i64),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Field::Text(ref s) => f.write_str(s),
            Field::Number(n) => write!(f, "{}", n),
            Field::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl<'a> From<&'a str> for Field {
    fn from(s: &'a str) -> Field {
        Field::Text(s.to_string())
    }
}

impl From<f64> for Field {
    fn from(n: f64) -> Field {
        Field::Number(n)
    }
}

impl From<i64> for Field {
    fn from(i: i64) -> Field {
        Field::Integer(i)
    }
}

/// A flat document. Keys are unique and keep their insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, Field)>,
}

impl Document {
    /// Make an empty document.
    pub fn new() -> Document {
        Document::default()
    }

    /// Set `key` to `value`, replacing any previous value in place.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<Field>,
    {
        let key = key.into();
        let value = value.into();
        match self.fields.iter().position(|&(ref k, _)| *k == key) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|&&(ref k, _)| k == key)
            .map(|&(_, ref v)| v)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> slice::Iter<(String, Field)> {
        self.fields.iter()
    }
}

/// The documents produced from one snapshot, one list per metric category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch {
    /// Documents derived from counters.
    pub counters: Vec<Document>,
    /// Documents derived from timer samples.
    pub timers: Vec<Document>,
    /// Documents derived from timer statistics.
    pub timer_data: Vec<Document>,
}

impl Batch {
    /// Total documents across all categories.
    pub fn len(&self) -> usize {
        self.counters.len() + self.timers.len() + self.timer_data.len()
    }

    /// True when no category holds a document.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pick the field names for a reversed list of name segments.
///
/// The last element of the reversed list is the first segment of the
/// original name.
pub fn key_names(reversed: &[&str]) -> &'static [&'static str] {
    match reversed.last() {
        Some(&"statsd") => &STATSD_KEYS,
        _ => &GROVE_KEYS,
    }
}

/// Build the document for a single counter.
///
/// Segments beyond the chosen key list are dropped. Names with fewer
/// segments than keys leave the trailing keys unset.
///
/// # Examples
///
/// ```
/// use statsd_elastic::document::{build_document, Field};
///
/// let doc = build_document("acme.billing.api.hits", 5.0, 1_700_000_000);
///
/// assert_eq!(doc.get("stat"), Some(&Field::from("hits")));
/// assert_eq!(doc.get("grove"), Some(&Field::from("acme")));
/// assert_eq!(doc.get("@timestamp"), Some(&Field::Integer(1_700_000_000_000)));
/// ```
pub fn build_document(name: &str, value: f64, timestamp: i64) -> Document {
    let mut segments: Vec<&str> = name.split('.').collect();
    segments.reverse();
    let keys = key_names(&segments);

    let mut doc = Document::new();
    for (key, segment) in keys.iter().zip(segments.iter()) {
        doc.set(*key, *segment);
    }
    doc.set("value", value);
    doc.set("@timestamp", time::secs_to_ms(timestamp));
    doc
}

/// Build one document per counter in the snapshot.
pub fn counter_documents(snapshot: &MetricSnapshot, timestamp: i64) -> Vec<Document> {
    snapshot
        .counters
        .iter()
        .map(|(name, value)| build_document(name, *value, timestamp))
        .collect()
}

fn timer_prefix(doc: &mut Document, name: &str) {
    let mut segments = name.split('.');
    for key in &TIMER_KEYS {
        doc.set(*key, segments.next().unwrap_or(""));
    }
}

/// Build one document per timer sample.
///
/// Timer names are not reversed: the first four segments populate
/// `ns, grp, tgt, act`, missing segments become empty strings.
pub fn timer_documents(snapshot: &MetricSnapshot, timestamp: i64) -> Vec<Document> {
    let ts = time::secs_to_ms(timestamp);
    let mut docs = Vec::new();
    for (name, samples) in &snapshot.timers {
        for sample in samples {
            let mut doc = Document::new();
            timer_prefix(&mut doc, name);
            doc.set("val", *sample);
            doc.set("@timestamp", ts);
            docs.push(doc);
        }
    }
    docs
}

/// Build one document per timer's statistics.
///
/// Every statistic becomes a field. A nested histogram is flattened so each
/// bin is a top-level field, and the `histogram` key itself is dropped.
pub fn timer_data_documents(snapshot: &MetricSnapshot, timestamp: i64) -> Vec<Document> {
    let ts = time::secs_to_ms(timestamp);
    let mut docs = Vec::with_capacity(snapshot.timer_data.len());
    for (name, stats) in &snapshot.timer_data {
        let mut doc = Document::new();
        let mut bins = Vec::new();
        for (stat, value) in stats {
            match *value {
                TimerStat::Value(v) => doc.set(stat.as_str(), v),
                TimerStat::Histogram(ref hist) => {
                    if stat == "histogram" {
                        bins.extend(hist.iter());
                    } else {
                        trace!("dropping nested statistic {} of {}", stat, name);
                    }
                }
            }
        }
        doc.set("@timestamp", ts);
        timer_prefix(&mut doc, name);
        for (bin, count) in bins {
            doc.set(bin.as_str(), *count);
        }
        docs.push(doc);
    }
    docs
}

/// Transform a whole snapshot.
///
/// Timer and timer-statistic export is off unless `with_timers` is set, in
/// which case those lists stay empty.
pub fn build_batch(snapshot: &MetricSnapshot, timestamp: i64, with_timers: bool) -> Batch {
    let mut batch = Batch {
        counters: counter_documents(snapshot, timestamp),
        timers: Vec::new(),
        timer_data: Vec::new(),
    };
    if with_timers {
        batch.timers = timer_documents(snapshot, timestamp);
        batch.timer_data = timer_data_documents(snapshot, timestamp);
    }
    batch
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};
    use std::collections::BTreeMap;

    fn text_of(doc: &Document, key: &str) -> Option<String> {
        match doc.get(key) {
            Some(&Field::Text(ref s)) => Some(s.clone()),
            _ => None,
        }
    }

    #[test]
    fn test_grove_counter() {
        let doc = build_document("acme.billing.api.hits", 5.0, 1_700_000_000);

        let keys: Vec<&str> = doc.iter().map(|&(ref k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["stat", "module", "customer", "grove", "value", "@timestamp"]
        );
        assert_eq!(text_of(&doc, "stat"), Some("hits".to_string()));
        assert_eq!(text_of(&doc, "module"), Some("api".to_string()));
        assert_eq!(text_of(&doc, "customer"), Some("billing".to_string()));
        assert_eq!(text_of(&doc, "grove"), Some("acme".to_string()));
        assert_eq!(doc.get("value"), Some(&Field::Number(5.0)));
        assert_eq!(doc.get("@timestamp"), Some(&Field::Integer(1_700_000_000_000)));
    }

    #[test]
    fn test_statsd_counter_uses_short_schema() {
        let doc = build_document("statsd.graphite.flush_time", 12.0, 10);

        assert_eq!(doc.len(), 4);
        assert_eq!(text_of(&doc, "stat"), Some("flush_time".to_string()));
        assert_eq!(text_of(&doc, "process"), Some("graphite".to_string()));
        assert!(doc.get("module").is_none());
        assert_eq!(doc.get("@timestamp"), Some(&Field::Integer(10_000)));
    }

    #[test]
    fn test_statsd_mid_path_is_not_internal() {
        // Only the leading segment selects the short schema.
        let doc = build_document("myapp.servers.web1.statsd", 5.0, 1_700_000_000);

        assert_eq!(text_of(&doc, "stat"), Some("statsd".to_string()));
        assert_eq!(text_of(&doc, "module"), Some("web1".to_string()));
        assert_eq!(text_of(&doc, "customer"), Some("servers".to_string()));
        assert_eq!(text_of(&doc, "grove"), Some("myapp".to_string()));
        assert!(doc.get("process").is_none());
        assert_eq!(doc.get("value"), Some(&Field::Number(5.0)));
        assert_eq!(doc.get("@timestamp"), Some(&Field::Integer(1_700_000_000_000)));
    }

    #[test]
    fn test_short_and_degenerate_names() {
        let doc = build_document("hits", 1.0, 0);
        assert_eq!(doc.len(), 3);
        assert_eq!(text_of(&doc, "stat"), Some("hits".to_string()));
        assert!(doc.get("module").is_none());

        let doc = build_document("", 1.0, 0);
        assert_eq!(text_of(&doc, "stat"), Some("".to_string()));
        assert_eq!(doc.len(), 3);

        let doc = build_document("statsd", 1.0, 0);
        assert_eq!(text_of(&doc, "stat"), Some("statsd".to_string()));
        assert!(doc.get("process").is_none());
    }

    #[test]
    fn test_extra_segments_dropped() {
        let doc = build_document("a.b.c.d.e.f", 1.0, 0);
        assert_eq!(doc.len(), 6);
        assert_eq!(text_of(&doc, "stat"), Some("f".to_string()));
        assert_eq!(text_of(&doc, "grove"), Some("c".to_string()));

        let doc = build_document("statsd.x.y.z", 1.0, 0);
        assert_eq!(doc.len(), 4);
        assert_eq!(text_of(&doc, "stat"), Some("z".to_string()));
        assert_eq!(text_of(&doc, "process"), Some("y".to_string()));
    }

    #[test]
    fn test_grove_schema_property() {
        fn inner(raw: Vec<String>, ts: i32) -> TestResult {
            let segments: Vec<String> =
                raw.into_iter().map(|s| s.replace('.', "")).collect();
            if segments.is_empty() || segments[0] == "statsd" {
                return TestResult::discard();
            }
            let name = segments.join(".");
            let doc = build_document(&name, 1.0, i64::from(ts));

            let mut reversed = segments.clone();
            reversed.reverse();
            for (i, key) in GROVE_KEYS.iter().enumerate() {
                let expected = reversed.get(i).cloned();
                if text_of(&doc, key) != expected {
                    return TestResult::failed();
                }
            }
            let expected_len = ::std::cmp::min(segments.len(), 4) + 2;
            if doc.len() != expected_len {
                return TestResult::failed();
            }
            if doc.get("@timestamp") != Some(&Field::Integer(i64::from(ts) * 1000)) {
                return TestResult::failed();
            }
            TestResult::passed()
        }
        QuickCheck::new()
            .tests(1000)
            .max_tests(10000)
            .quickcheck(inner as fn(Vec<String>, i32) -> TestResult);
    }

    #[test]
    fn test_statsd_schema_property() {
        fn inner(raw: Vec<String>) -> TestResult {
            let mut segments: Vec<String> =
                raw.into_iter().map(|s| s.replace('.', "")).collect();
            segments.insert(0, "statsd".to_string());
            let doc = build_document(&segments.join("."), 2.0, 1);

            let populated = doc
                .iter()
                .filter(|&&(ref k, _)| k != "value" && k != "@timestamp")
                .count();
            let expected = ::std::cmp::min(segments.len(), 2);
            TestResult::from_bool(populated == expected && doc.get("module").is_none())
        }
        QuickCheck::new()
            .tests(1000)
            .max_tests(10000)
            .quickcheck(inner as fn(Vec<String>) -> TestResult);
    }

    #[test]
    fn test_counter_documents() {
        let snap = MetricSnapshot::new()
            .counter("a.b", 1.0)
            .counter("statsd.numStats", 2.0)
            .timer("t.x", vec![1.0]);
        let docs = counter_documents(&snap, 3);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_timer_documents() {
        let snap = MetricSnapshot::new().timer("api.web.db.query", vec![1.5, 3.0]);
        let docs = timer_documents(&snap, 2);

        assert_eq!(docs.len(), 2);
        assert_eq!(text_of(&docs[0], "ns"), Some("api".to_string()));
        assert_eq!(text_of(&docs[0], "act"), Some("query".to_string()));
        assert_eq!(docs[0].get("val"), Some(&Field::Number(1.5)));
        assert_eq!(docs[1].get("val"), Some(&Field::Number(3.0)));
        assert_eq!(docs[1].get("@timestamp"), Some(&Field::Integer(2000)));

        let snap = MetricSnapshot::new().timer("short", vec![1.0]);
        let docs = timer_documents(&snap, 2);
        assert_eq!(text_of(&docs[0], "ns"), Some("short".to_string()));
        assert_eq!(text_of(&docs[0], "grp"), Some("".to_string()));
        assert_eq!(text_of(&docs[0], "act"), Some("".to_string()));
    }

    #[test]
    fn test_timer_data_documents_flatten_histogram() {
        let mut hist = BTreeMap::new();
        hist.insert("bin_50".to_string(), 4.0);
        hist.insert("bin_inf".to_string(), 1.0);
        let mut stats = BTreeMap::new();
        stats.insert("mean".to_string(), TimerStat::Value(20.5));
        stats.insert("count".to_string(), TimerStat::Value(5.0));
        stats.insert("histogram".to_string(), TimerStat::Histogram(hist));
        let snap = MetricSnapshot::new().timer_data("api.web.db.query", stats);

        let docs = timer_data_documents(&snap, 7);
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert!(doc.get("histogram").is_none());
        assert_eq!(doc.get("mean"), Some(&Field::Number(20.5)));
        assert_eq!(doc.get("bin_50"), Some(&Field::Number(4.0)));
        assert_eq!(doc.get("bin_inf"), Some(&Field::Number(1.0)));
        assert_eq!(text_of(doc, "tgt"), Some("db".to_string()));
        assert_eq!(doc.get("@timestamp"), Some(&Field::Integer(7000)));
    }

    #[test]
    fn test_build_batch_timers_disabled() {
        let snap = MetricSnapshot::new()
            .counter("a.b", 1.0)
            .timer("t.x", vec![1.0, 2.0]);

        let batch = build_batch(&snap, 1, false);
        assert_eq!(batch.counters.len(), 1);
        assert!(batch.timers.is_empty());
        assert!(batch.timer_data.is_empty());
        assert_eq!(batch.len(), 1);

        let batch = build_batch(&snap, 1, true);
        assert_eq!(batch.timers.len(), 2);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_document_set_replaces_in_place() {
        let mut doc = Document::new();
        doc.set("a", 1.0);
        doc.set("b", "x");
        doc.set("a", 2.0);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.iter().next(), Some(&("a".to_string(), Field::Number(2.0))));
        assert_eq!(doc.get("b"), Some(&Field::from("x")));
        assert!(doc.get("c").is_none());
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Number(5.0).to_string(), "5");
        assert_eq!(Field::Number(0.25).to_string(), "0.25");
        assert_eq!(Field::Integer(1_700_000_000_000).to_string(), "1700000000000");
        assert_eq!(Field::from("web1").to_string(), "web1");
    }
}

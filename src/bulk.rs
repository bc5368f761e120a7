//! Render documents into the Elasticsearch bulk-write format.
//!
//! The bulk body is newline delimited: every document is preceded by an
//! action line naming the target index and document type. See
//! <https://www.elastic.co/guide/en/elasticsearch/reference/current/docs-bulk.html>.

use chrono::{DateTime, Utc};
use document::{Batch, Document};
use serde_json::Value;

/// Document type names, one per metric category.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentTypes {
    /// Type of counter documents.
    pub counter: String,
    /// Type of timer sample documents.
    pub timer: String,
    /// Type of timer statistic documents.
    pub timer_data: String,
}

impl Default for DocumentTypes {
    fn default() -> Self {
        DocumentTypes {
            counter: "counter".to_string(),
            timer: "timer".to_string(),
            timer_data: "timer_stats".to_string(),
        }
    }
}

/// The daily index for `date`: `<prefix>-YYYY.MM.DD`.
///
/// # Examples
///
/// ```
/// extern crate chrono;
/// extern crate statsd_elastic;
///
/// use chrono::{TimeZone, Utc};
/// use statsd_elastic::bulk::index_name;
///
/// # fn main() {
/// let date = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 59).unwrap();
/// assert_eq!(index_name("statsd", &date), "statsd-2024.03.07");
/// # }
/// ```
#[inline]
pub fn index_name(prefix: &str, date: &DateTime<Utc>) -> String {
    format!("{}-{}", prefix, date.format("%Y.%m.%d"))
}

fn action_line(buffer: &mut String, index: &str, doc_type: &str) {
    let header: Value = json!({
        "index": {
            "_index": index,
            "_type": doc_type,
        }
    });
    buffer.push_str(&header.to_string());
    buffer.push('\n');
}

#[inline]
fn push_json_str(buffer: &mut String, s: &str) {
    buffer.push_str(&Value::from(s).to_string());
}

/// Append a document as a single line of string-valued pairs.
///
/// Every value is written as a JSON string, numbers included.
pub fn source_line(buffer: &mut String, doc: &Document) {
    buffer.push('{');
    let mut first = true;
    for &(ref key, ref value) in doc.iter() {
        if !first {
            buffer.push(',');
        }
        first = false;
        push_json_str(buffer, key);
        buffer.push(':');
        push_json_str(buffer, &value.to_string());
    }
    buffer.push('}');
    buffer.push('\n');
}

/// Append an action line and a source line for every document.
pub fn push_documents(buffer: &mut String, docs: &[Document], index: &str, doc_type: &str) {
    for doc in docs {
        action_line(buffer, index, doc_type);
        source_line(buffer, doc);
    }
}

/// Build the full bulk body for a batch.
///
/// Categories are written counters first, then timers, then timer
/// statistics.
pub fn payload(batch: &Batch, index: &str, types: &DocumentTypes) -> String {
    let mut buffer = String::with_capacity(4048);
    push_documents(&mut buffer, &batch.counters, index, &types.counter);
    push_documents(&mut buffer, &batch.timers, index, &types.timer);
    push_documents(&mut buffer, &batch.timer_data, index, &types.timer_data);
    buffer
}

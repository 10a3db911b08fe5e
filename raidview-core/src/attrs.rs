//! Typed access to item attributes
//!
//! Attributes arrive as strings. Readers never fail: missing or malformed
//! values resolve to documented fallbacks (`""`, `0`, `None`).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeMap;

/// Read-only attribute set captured from an item at load time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet(BTreeMap<String, String>);

impl AttributeSet {
    pub fn new(attrs: BTreeMap<String, String>) -> Self {
        AttributeSet(attrs)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// String value, empty when absent
    pub fn string(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Float value; absent or unparsable values read as `0.0`
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).and_then(parse_float).unwrap_or(0.0)
    }

    /// Integer value; absent or unparsable values read as `0`
    pub fn integer(&self, name: &str) -> i64 {
        self.get(name).and_then(parse_int).unwrap_or(0)
    }

    /// Date as milliseconds since the Unix epoch, when present and parsable
    pub fn date_millis(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(parse_date_millis)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        AttributeSet(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Parse the longest leading decimal number, ignoring leading whitespace.
///
/// `"7.5"` and `"7.5 / 10"` both yield `7.5`; `"n/a"` yields `None`.
pub fn parse_float(s: &str) -> Option<f64> {
    static FLOAT_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = FLOAT_RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)").unwrap()
    });
    let value: f64 = re.captures(s)?.get(1)?.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a leading base-10 integer, ignoring leading whitespace
pub fn parse_int(s: &str) -> Option<i64> {
    static INT_RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let re = INT_RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").unwrap());
    re.captures(s)?.get(1)?.as_str().parse().ok()
}

/// Parse an ISO-8601 date or date-time into epoch milliseconds.
///
/// Accepts RFC 3339 timestamps, offset-less date-times (read as UTC) and
/// plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

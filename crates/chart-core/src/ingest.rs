// File: crates/chart-core/src/ingest.rs
// Summary: Wire shape of the open-data payload and lenient field parsing (dates, counters).

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ChartError, ChartResult};

/// Top-level response: `{ success, result: { records: [...] } }`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<ResultSet>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// One observation as received. Fields other than these four are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "nullable_string")]
    pub county: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub todays_date: String,
    #[serde(default, deserialize_with = "counter")]
    pub hospitalized_covid_patients: i64,
    #[serde(default, deserialize_with = "counter")]
    pub hospitalized_suspected_covid_patients: i64,
}

impl Payload {
    /// Decode a response body. Decode errors count as fetch failures.
    pub fn from_slice(bytes: &[u8]) -> ChartResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ChartError::fetch_with("response body is not a valid payload", e))
    }

    pub fn records(&self) -> &[RawRecord] {
        self.result.as_ref().map(|r| r.records.as_slice()).unwrap_or(&[])
    }
}

impl RawRecord {
    pub fn date(&self) -> Option<NaiveDateTime> {
        parse_date(&self.todays_date)
    }
}

/// Parse the date forms the source has been seen to emit.
/// Offsets are normalised to UTC; everything else is taken as naive wall-clock time.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%b %d %Y", "%B %d %Y", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Integer value of a counter field; anything missing or unreadable is zero.
pub fn counter_value(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_int_prefix(s).unwrap_or(0),
        _ => 0,
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits. `"5.0"` is 5.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let n: i64 = rest[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}

fn counter<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().map(counter_value).unwrap_or(0))
}

fn nullable_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_date_forms() {
        let want = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_date("Apr 01 2020"), Some(want));
        assert_eq!(parse_date("2020-04-01"), Some(want));
        assert_eq!(parse_date("2020-04-01T00:00:00"), Some(want));
        assert_eq!(parse_date("2020-04-01T00:00:00Z"), Some(want));
        assert_eq!(parse_date("2020-04-01T02:00:00+02:00"), Some(want));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn counters_are_lenient() {
        assert_eq!(counter_value(&json!(5)), 5);
        assert_eq!(counter_value(&json!(5.9)), 5);
        assert_eq!(counter_value(&json!("12")), 12);
        assert_eq!(counter_value(&json!("12.0")), 12);
        assert_eq!(counter_value(&json!(" -3")), -3);
        assert_eq!(counter_value(&json!("")), 0);
        assert_eq!(counter_value(&json!("n/a")), 0);
        assert_eq!(counter_value(&json!(null)), 0);
        assert_eq!(counter_value(&json!(true)), 0);
    }

    #[test]
    fn record_fields_default_when_absent_or_null() {
        let payload: Payload = serde_json::from_value(json!({
            "success": true,
            "result": { "records": [
                { "county": "Napa", "todays_date": "2020-04-02T00:00:00",
                  "hospitalized_covid_patients": null, "_id": 7 },
                { "county": null }
            ]}
        }))
        .unwrap();
        let recs = payload.records();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].county, "Napa");
        assert_eq!(recs[0].hospitalized_covid_patients, 0);
        assert_eq!(recs[0].hospitalized_suspected_covid_patients, 0);
        assert_eq!(recs[1].county, "");
        assert_eq!(recs[1].date(), None);
    }

    #[test]
    fn failed_payload_has_no_records() {
        let payload = Payload::from_slice(br#"{"success": false}"#).unwrap();
        assert!(!payload.success);
        assert!(payload.records().is_empty());
    }

    #[test]
    fn garbage_body_is_a_fetch_error() {
        let err = Payload::from_slice(b"<html>502</html>").unwrap_err();
        assert!(matches!(err, ChartError::Fetch { .. }));
    }
}

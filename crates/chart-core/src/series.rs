// File: crates/chart-core/src/series.rs
// Summary: Series model and the record filter/aggregator producing cumulative per-county series.
// Notes:
// - Running sums cover every record of a county in feed order, including
//   records the date cutoff later drops. Points are never re-sorted.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::error::{ChartError, ChartResult};
use crate::ingest::{Payload, RawRecord};

/// Counties plotted by default.
pub const DEFAULT_COUNTIES: [&str; 9] = [
    "Alameda",
    "Contra Costa",
    "Marin",
    "Santa Clara",
    "San Francisco",
    "Sonoma",
    "Napa",
    "San Mateo",
    "Solano",
];

/// Seed of the suspected running sum; keeps the first display value off zero for log scale.
pub const SUSPECTED_SEED: f64 = 0.1;

/// First reporting day kept on the chart.
pub fn default_cutoff() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2020, 4, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// One time-stamped observation with cumulative counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataPoint {
    pub date: NaiveDateTime,
    pub confirmed: f64,
    pub suspected: f64,
}

impl DataPoint {
    /// Value used for plotting and lookup.
    #[inline]
    pub fn display_value(&self) -> f64 {
        (self.confirmed + self.suspected).floor()
    }
}

/// One chart line. Points are ascending by date.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub key: String,
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn new(key: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self { key: key.into(), points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn display_values(&self) -> Vec<f64> {
        self.points.iter().map(DataPoint::display_value).collect()
    }
}

/// Which counties and dates survive aggregation.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesFilter {
    pub keys: Vec<String>,
    pub cutoff: NaiveDateTime,
}

impl Default for SeriesFilter {
    fn default() -> Self {
        Self {
            keys: DEFAULT_COUNTIES.iter().map(|k| k.to_string()).collect(),
            cutoff: default_cutoff(),
        }
    }
}

impl SeriesFilter {
    pub fn allows(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// Group, accumulate and filter a payload into series, in first-seen county order.
/// Fails with [`ChartError::Ingest`] when the payload reports `success: false`.
pub fn aggregate(payload: &Payload, filter: &SeriesFilter) -> ChartResult<Vec<Series>> {
    if !payload.success {
        return Err(ChartError::Ingest);
    }

    let mut groups: IndexMap<&str, Vec<&RawRecord>> = IndexMap::new();
    for rec in payload.records() {
        groups.entry(rec.county.as_str()).or_default().push(rec);
    }

    let series = groups
        .into_iter()
        .filter(|(key, _)| filter.allows(key))
        .map(|(key, records)| Series::new(key, accumulate(&records, filter.cutoff)))
        .collect::<Vec<_>>();

    tracing::debug!(
        records = payload.records().len(),
        series = series.len(),
        "aggregated payload"
    );
    Ok(series)
}

fn accumulate(records: &[&RawRecord], cutoff: NaiveDateTime) -> Vec<DataPoint> {
    let mut confirmed = 0.0f64;
    let mut suspected = SUSPECTED_SEED;
    let mut points = Vec::with_capacity(records.len());
    for rec in records {
        confirmed += rec.hospitalized_covid_patients as f64;
        suspected += rec.hospitalized_suspected_covid_patients as f64;
        match rec.date() {
            Some(date) if date >= cutoff => points.push(DataPoint { date, confirmed, suspected }),
            _ => {}
        }
    }
    points
}

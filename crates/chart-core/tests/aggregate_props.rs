// File: crates/chart-core/tests/aggregate_props.rs
// Purpose: Property checks for the record aggregator.
// Behavior:
// - Feeds date-ordered random feeds through `aggregate`.
// - Checks ordering, monotone running sums, idempotence and the allow-list.

use chart_core::ingest::{RawRecord, ResultSet};
use chart_core::{aggregate, Payload, SeriesFilter};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

const COUNTIES: [&str; 4] = ["Marin", "Napa", "Fresno", "Solano"];

fn feed() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec((0usize..COUNTIES.len(), 0u8..3, 0i64..500, 0i64..500), 0..80).prop_map(|rows| {
        let mut day = NaiveDate::from_ymd_opt(2020, 3, 25).unwrap();
        rows.into_iter()
            .map(|(county, step, confirmed, suspected)| {
                day += Duration::days(step as i64);
                RawRecord {
                    county: COUNTIES[county].to_string(),
                    todays_date: day.format("%Y-%m-%d").to_string(),
                    hospitalized_covid_patients: confirmed,
                    hospitalized_suspected_covid_patients: suspected,
                }
            })
            .collect()
    })
}

fn payload(records: Vec<RawRecord>) -> Payload {
    Payload { success: true, result: Some(ResultSet { records }) }
}

proptest! {
    #[test]
    fn series_dates_are_non_decreasing(records in feed()) {
        let series = aggregate(&payload(records), &SeriesFilter::default()).unwrap();
        for s in &series {
            prop_assert!(s.points.windows(2).all(|w| w[0].date <= w[1].date), "{} out of order", s.key);
        }
    }

    #[test]
    fn running_sums_never_decrease(records in feed()) {
        let series = aggregate(&payload(records), &SeriesFilter::default()).unwrap();
        for s in &series {
            for w in s.points.windows(2) {
                prop_assert!(w[1].confirmed >= w[0].confirmed);
                prop_assert!(w[1].suspected >= w[0].suspected);
                prop_assert!(w[1].display_value() >= w[0].display_value());
            }
            for p in &s.points {
                prop_assert!(p.suspected >= 0.1);
            }
        }
    }

    #[test]
    fn aggregation_is_idempotent(records in feed()) {
        let p = payload(records);
        let filter = SeriesFilter::default();
        prop_assert_eq!(aggregate(&p, &filter).unwrap(), aggregate(&p, &filter).unwrap());
    }

    #[test]
    fn only_listed_counties_survive(records in feed()) {
        let filter = SeriesFilter::default();
        let series = aggregate(&payload(records), &filter).unwrap();
        prop_assert!(series.iter().all(|s| filter.allows(&s.key)));
        prop_assert!(series.iter().all(|s| s.key != "Fresno"));
        prop_assert!(series.iter().all(|s| s.points.iter().all(|p| p.date >= filter.cutoff)));
    }
}

#[test]
fn fixture_decodes_leniently() {
    let bytes = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/hospitalizations.json")).unwrap();
    let p = Payload::from_slice(&bytes).expect("fixture decodes");
    assert_eq!(p.records().len(), 120);
    let series = aggregate(&p, &SeriesFilter::default()).unwrap();
    let keys: Vec<_> = series.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, ["Alameda", "Contra Costa", "Marin", "San Francisco"]);
    assert!(series.iter().all(|s| s.len() == 20));
}

#[test]
fn unsuccessful_payload_yields_no_series() {
    let p = Payload::from_slice(br#"{"success": false}"#).unwrap();
    assert!(matches!(aggregate(&p, &SeriesFilter::default()), Err(chart_core::ChartError::Ingest)));
}

// File: crates/chart-core/tests/refresh.rs
// Purpose: Keyed series refresh: update in place, enter/exit diffs, single overlay, stable colors.

use chart_core::ingest::{RawRecord, ResultSet};
use chart_core::theme::TABLEAU10;
use chart_core::{Chart, ChartConfig, Payload, ScaleMode};

fn rec(county: &str, date: &str, confirmed: i64) -> RawRecord {
    RawRecord {
        county: county.into(),
        todays_date: date.into(),
        hospitalized_covid_patients: confirmed,
        hospitalized_suspected_covid_patients: 1,
    }
}

fn payload(counties: &[&str]) -> Payload {
    let records = ["2020-04-01", "2020-04-02", "2020-04-03"]
        .iter()
        .flat_map(|d| counties.iter().enumerate().map(move |(i, c)| rec(c, d, 5 * (i as i64 + 1))))
        .collect();
    Payload { success: true, result: Some(ResultSet { records }) }
}

#[test]
fn refresh_updates_paths_in_place() {
    let mut chart = Chart::new(&ChartConfig::default());
    let first = chart.ingest(&payload(&["Marin", "Napa"])).unwrap();
    assert_eq!(first.entered, ["Marin", "Napa"]);
    let marin_id = chart.scene().path("Marin").unwrap().id;

    let second = chart.ingest(&payload(&["Napa", "Marin", "Solano"])).unwrap();
    assert_eq!(second.entered, ["Solano"]);
    assert_eq!(second.updated, ["Napa", "Marin"]);
    assert!(second.exited.is_empty());
    assert_eq!(chart.scene().path("Marin").unwrap().id, marin_id);

    let third = chart.ingest(&payload(&["Solano"])).unwrap();
    assert_eq!(third.exited, ["Marin", "Napa"]);
    assert_eq!(chart.scene().series.len(), 1);
}

#[test]
fn overlay_is_attached_once() {
    let mut chart = Chart::new(&ChartConfig::default());
    assert!(chart.scene().overlay.is_none());
    for _ in 0..3 {
        chart.ingest(&payload(&["Marin"])).unwrap();
        chart.set_scale_mode(ScaleMode::Linear);
        chart.refresh();
    }
    assert!(chart.scene().overlay.is_some());
    assert_eq!(chart.scene().overlay_attachments(), 1);
}

#[test]
fn colors_follow_the_key_not_the_position() {
    let mut chart = Chart::new(&ChartConfig::default());
    chart.ingest(&payload(&["Marin", "Napa"])).unwrap();
    assert_eq!(chart.scene().path("Marin").unwrap().color, TABLEAU10[0]);
    assert_eq!(chart.scene().path("Napa").unwrap().color, TABLEAU10[1]);

    chart.ingest(&payload(&["Solano", "Napa", "Marin"])).unwrap();
    assert_eq!(chart.scene().path("Marin").unwrap().color, TABLEAU10[0]);
    assert_eq!(chart.scene().path("Napa").unwrap().color, TABLEAU10[1]);
    assert_eq!(chart.scene().path("Solano").unwrap().color, TABLEAU10[2]);
}

#[test]
fn switching_scale_mode_replaces_the_state_and_moves_points() {
    let mut chart = Chart::new(&ChartConfig::default());
    assert_eq!(chart.scale_mode(), ScaleMode::Log);
    assert!(chart.set_scale_mode(ScaleMode::Linear).is_none(), "nothing to redraw before data");
    chart.set_scale_mode(ScaleMode::Log);

    chart.ingest(&payload(&["Marin", "Napa"])).unwrap();
    let log_points = chart.scene().path("Marin").unwrap().points.clone();
    let log_state = chart.state().cloned().unwrap();

    let diff = chart.set_scale_mode(ScaleMode::Linear).unwrap();
    assert_eq!(diff.updated, ["Marin", "Napa"]);
    let state = chart.state().unwrap();
    assert_eq!(state.mode, ScaleMode::Linear);
    assert_eq!(state.series, log_state.series);
    assert_ne!(state.scales, log_state.scales);
    assert_ne!(chart.scene().path("Marin").unwrap().points, log_points);
    // x positions are independent of the value scale
    let xs: Vec<f64> = chart.scene().path("Marin").unwrap().points.iter().map(|p| p.x).collect();
    assert_eq!(xs, log_points.iter().map(|p| p.x).collect::<Vec<_>>());
}

#[test]
fn axes_and_grid_are_rebuilt_each_refresh() {
    let mut chart = Chart::new(&ChartConfig::default());
    chart.ingest(&payload(&["Marin"])).unwrap();
    let classes: Vec<_> = chart.scene().axes.iter().map(|a| a.class).collect();
    assert_eq!(classes, ["x axis", "y axis", "y axis_grid"]);
    assert_eq!(chart.scene().axes[0].translate, (0.0, 500.0));
    assert_eq!(chart.scene().axes[2].tick_size, -1100.0);
}

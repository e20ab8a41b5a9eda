// File: crates/chart-core/src/chart.rs
// Summary: Chart: owns derived state, the retained scene and the load orchestrator; drives refresh and annotation.

use std::path::Path;

use crate::annotation::{AnnotationEngine, LegendEntry, PointerEvent, Visibility};
use crate::axis::Axis;
use crate::config::ChartConfig;
use crate::error::{ChartError, ChartResult};
use crate::geometry::Point;
use crate::ingest::Payload;
use crate::loader::{Alert, AlertSink, DataSource, LoadOrchestrator, LoadState, LoadTicket, LogAlerts};
use crate::scale::{build_scales, ScaleMapping, ScaleMode};
use crate::scene::{PathUpdate, Scene, SceneDiff};
use crate::series::{aggregate, Series, SeriesFilter};
use crate::svg;
use crate::text::{ApproxMeasure, TextMeasure};
use crate::theme::{ColorScale, Theme};
use crate::types::{Layout, Viewport};

/// Everything derived from one successful load. Replaced as a whole, never patched.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartState {
    pub series: Vec<Series>,
    pub scales: ScaleMapping,
    pub mode: ScaleMode,
    /// Load generation that produced `series`.
    pub generation: u64,
}

/// What happened to a completed load.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    Committed(SceneDiff),
    Failed(Alert),
    /// A newer load was started after this one; its result was dropped.
    Stale { generation: u64, latest: u64 },
}

pub struct Chart {
    layout: Layout,
    filter: SeriesFilter,
    mode: ScaleMode,
    state: Option<ChartState>,
    colors: ColorScale,
    scene: Scene,
    annotation: AnnotationEngine,
    loader: LoadOrchestrator,
    alerts: Vec<Alert>,
    sink: Box<dyn AlertSink>,
    measure: Box<dyn TextMeasure>,
}

impl Chart {
    pub fn new(config: &ChartConfig) -> Self {
        Self::with_parts(config.layout(), config.filter(), config.scale_mode(), config.theme())
    }

    pub fn with_parts(layout: Layout, filter: SeriesFilter, mode: ScaleMode, theme: Theme) -> Self {
        Self {
            layout,
            filter,
            mode,
            state: None,
            colors: ColorScale::default(),
            scene: Scene::new(layout, theme),
            annotation: AnnotationEngine::new(),
            loader: LoadOrchestrator::new(),
            alerts: Vec::new(),
            sink: Box::new(LogAlerts),
            measure: Box::new(ApproxMeasure),
        }
    }

    pub fn with_alert_sink(mut self, sink: Box<dyn AlertSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_text_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn state(&self) -> Option<&ChartState> {
        self.state.as_ref()
    }

    pub fn series(&self) -> &[Series] {
        self.state.as_ref().map(|s| s.series.as_slice()).unwrap_or(&[])
    }

    pub fn scales(&self) -> Option<&ScaleMapping> {
        self.state.as_ref().map(|s| &s.scales)
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Every alert raised so far, oldest first.
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn legend(&self) -> &[LegendEntry] {
        self.annotation.legend()
    }

    pub fn annotation_visibility(&self) -> Visibility {
        self.annotation.visibility()
    }

    /// Re-read the selector. Rebuilds scales and redraws when data is present.
    pub fn set_scale_mode(&mut self, mode: ScaleMode) -> Option<SceneDiff> {
        self.mode = mode;
        let state = self.state.take()?;
        Some(self.commit(state.series, state.generation))
    }

    /// Transform a payload and redraw as one synchronous load.
    /// A rejected payload fails the load like a fetch error would.
    pub fn ingest(&mut self, payload: &Payload) -> ChartResult<SceneDiff> {
        let ticket = self.begin_load();
        match aggregate(payload, &self.filter) {
            Ok(series) => Ok(self.succeed(ticket, series)),
            Err(err) => {
                self.raise(ticket, &err);
                Err(err)
            }
        }
    }

    /// Rebuild scales for the current mode and redraw the current series.
    pub fn refresh(&mut self) -> SceneDiff {
        match self.state.take() {
            Some(state) => self.commit(state.series, state.generation),
            None => SceneDiff::default(),
        }
    }

    fn commit(&mut self, series: Vec<Series>, generation: u64) -> SceneDiff {
        let scales = build_scales(&series, self.mode, &self.layout, self.filter.cutoff);
        self.state = Some(ChartState { series, scales, mode: self.mode, generation });
        self.redraw()
    }

    fn redraw(&mut self) -> SceneDiff {
        let Some(state) = self.state.as_ref() else {
            return SceneDiff::default();
        };
        let scales = state.scales;

        self.scene.set_axes(vec![
            Axis::bottom_time(&scales.x, self.layout.plot_height),
            Axis::left_value(&scales.y),
            Axis::left_grid(&scales.y, self.layout.plot_width),
        ]);

        let updates = state
            .series
            .iter()
            .filter(|s| s.len() >= 2)
            .map(|s| PathUpdate {
                key: s.key.clone(),
                color: self.colors.color(&s.key),
                points: s
                    .points
                    .iter()
                    .map(|p| Point::new(scales.x.to_px(&p.date), scales.y.to_px(p.display_value())))
                    .collect(),
            })
            .collect();
        let diff = self.scene.join_series(updates);
        if self.scene.attach_overlay() {
            tracing::debug!("pointer overlay attached");
        }
        tracing::debug!(
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            mode = %self.mode,
            "series redrawn"
        );

        self.relayout_annotation();
        diff
    }

    /// Dispatch a pointer event from the overlay (plot coordinates).
    pub fn pointer(&mut self, event: PointerEvent) {
        if self.scene.overlay.is_none() {
            return;
        }
        self.annotation.handle(event);
        self.relayout_annotation();
    }

    /// Convenience for hosts that only have container pixels.
    pub fn pointer_move_container(&mut self, viewport: &Viewport, px: f64, py: f64) {
        let (x, y) = viewport.to_plot(&self.layout, px, py);
        self.pointer(PointerEvent::Move { x, y });
    }

    fn relayout_annotation(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        self.scene.annotation = self.annotation.layout(
            &state.series,
            &state.scales,
            &mut self.colors,
            self.measure.as_ref(),
            &self.layout,
        );
    }

    // ---- load cycle -----------------------------------------------------------

    /// Clear any indicator and show a fresh spinner; the ticket stamps this load.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = self.loader.begin();
        self.scene.spinner = self.loader.spinner();
        ticket
    }

    /// Commit a fetched result if `ticket` is still the latest load.
    pub fn finish_load(&mut self, ticket: LoadTicket, fetched: ChartResult<Payload>) -> LoadOutcome {
        if !self.loader.is_current(ticket) {
            let latest = self.loader.latest();
            tracing::warn!(generation = ticket.generation, latest, "discarding stale load");
            return LoadOutcome::Stale { generation: ticket.generation, latest };
        }

        let series = fetched.and_then(|payload| aggregate(&payload, &self.filter));
        match series {
            Ok(series) => LoadOutcome::Committed(self.succeed(ticket, series)),
            Err(err) => LoadOutcome::Failed(self.raise(ticket, &err)),
        }
    }

    fn succeed(&mut self, ticket: LoadTicket, series: Vec<Series>) -> SceneDiff {
        self.loader.succeed(ticket);
        self.scene.spinner = self.loader.spinner();
        let count = series.len();
        let diff = self.commit(series, ticket.generation);
        tracing::info!(generation = ticket.generation, series = count, "load committed");
        diff
    }

    fn raise(&mut self, ticket: LoadTicket, err: &ChartError) -> Alert {
        let alert = Alert::from_error(err);
        self.loader.fail(ticket, alert.clone());
        self.scene.spinner = self.loader.spinner();
        self.sink.alert(&alert);
        self.alerts.push(alert.clone());
        alert
    }

    /// One full refresh cycle against `source`.
    pub async fn load<S: DataSource + ?Sized>(&mut self, source: &S) -> LoadOutcome {
        let ticket = self.begin_load();
        tracing::info!(source = %source.describe(), generation = ticket.generation, "fetching");
        let fetched = source.fetch().await;
        self.finish_load(ticket, fetched)
    }

    // ---- output ---------------------------------------------------------------

    pub fn render_svg(&self) -> ChartResult<String> {
        svg::render(&self.scene)
    }

    pub fn write_svg(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        let svg = self.render_svg()?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChartError::Render(e.to_string()))?;
        }
        std::fs::write(path, svg).map_err(|e| ChartError::Render(e.to_string()))
    }
}

impl Default for Chart {
    fn default() -> Self {
        Self::new(&ChartConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawRecord, ResultSet};
    use crate::scene::Spinner;

    fn payload() -> Payload {
        let records = (1..=3)
            .map(|d| RawRecord {
                county: "Marin".into(),
                todays_date: format!("2020-04-0{d}"),
                hospitalized_covid_patients: 2,
                hospitalized_suspected_covid_patients: 0,
            })
            .collect();
        Payload { success: true, result: Some(ResultSet { records }) }
    }

    #[test]
    fn pointer_before_first_render_is_ignored() {
        let mut chart = Chart::default();
        chart.pointer(PointerEvent::Move { x: 10.0, y: 10.0 });
        assert!(chart.scene().annotation.crosshair.is_none());
        assert!(chart.legend().is_empty());
    }

    #[test]
    fn container_pixels_map_into_the_plot() {
        let mut chart = Chart::default();
        chart.ingest(&payload()).unwrap();
        // Half-size container: (300, 150) is logical (600, 300), plot (550, 250).
        chart.pointer_move_container(&Viewport::new(600.0, 300.0), 300.0, 150.0);
        let (top, _) = chart.scene().annotation.crosshair.unwrap();
        assert_eq!(top.x, 550.0);
        assert_eq!(chart.scene().annotation.legend.origin.y, 250.0);
    }

    #[test]
    fn failed_ingest_leaves_state_untouched() {
        let mut chart = Chart::default();
        chart.ingest(&payload()).unwrap();
        let before = chart.state().cloned();
        assert!(chart.ingest(&Payload::default()).is_err());
        assert_eq!(chart.state().cloned(), before);
    }

    #[test]
    fn rejected_payload_raises_an_alert_and_fails_the_spinner() {
        let mut chart = Chart::default();
        let err = chart.ingest(&Payload::default()).unwrap_err();
        assert!(matches!(err, ChartError::Ingest));
        assert_eq!(chart.scene().spinner, Spinner::Failed);
        assert!(matches!(chart.load_state(), LoadState::Failed { generation: 1, .. }));
        assert_eq!(chart.alerts().len(), 1);
        assert!(chart.alerts()[0].message.contains("ingest failed"));

        // A later good payload clears the indicator.
        chart.ingest(&payload()).unwrap();
        assert_eq!(chart.scene().spinner, Spinner::Hidden);
        assert_eq!(chart.state().unwrap().generation, 2);
    }
}

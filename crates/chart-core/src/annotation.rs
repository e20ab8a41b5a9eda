// File: crates/chart-core/src/annotation.rs
// Summary: Pointer-driven annotation: crosshair, per-series interpolated markers and the sorted legend.
// Notes:
// - The interpolation fraction comes from the pointed date's time of day only,
//   not from where the date falls between the two bracketing points. Past the
//   last point the final pair is still interpolated with that fraction.

use chrono::{NaiveDateTime, Timelike};

use crate::geometry::{clamp, lerp, Point};
use crate::grid::format_integer;
use crate::scale::ScaleMapping;
use crate::scene::{AnnotationLayer, Legend, LegendRow, Marker};
use crate::series::{DataPoint, Series};
use crate::text::{TextMeasure, LABEL_FONT_SIZE};
use crate::theme::ColorScale;
use crate::types::Layout;

pub const MARKER_RADIUS: f64 = 2.0;
pub const LEGEND_PADDING: f64 = 10.0;
pub const LEGEND_ROW_HEIGHT: f64 = 25.0;
pub const LEGEND_SWATCH: f64 = 20.0;
pub const LEGEND_TEXT_X: f64 = 30.0;
/// Gap kept between the pointer and a legend flipped to its left/top.
pub const LEGEND_FLIP_GAP: f64 = 20.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Pointer input in plot coordinates, as delivered by the overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Enter,
    Move { x: f64, y: f64 },
    Leave,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    pub key: String,
    pub value: f64,
}

/// Fraction of the day elapsed at `t`, from whole seconds.
pub fn time_of_day_fraction(t: &NaiveDateTime) -> f64 {
    (t.second() + t.minute() * 60 + t.hour() * 3600) as f64 / SECONDS_PER_DAY
}

/// Indices `(left, right)` bracketing `date`: `right` is the first point dated
/// after `date`, clamped to the last index; `left` is the one before it.
pub fn bracket(points: &[DataPoint], date: &NaiveDateTime) -> Option<(usize, usize)> {
    if points.is_empty() {
        return None;
    }
    let insert = points.partition_point(|p| p.date <= *date);
    let right = clamp(insert, 0, points.len() - 1);
    let left = right.saturating_sub(1);
    Some((left, right))
}

/// Interpolated display value of `series` at `date`; `None` for an empty series.
pub fn value_at(series: &Series, date: &NaiveDateTime) -> Option<f64> {
    let (left, right) = bracket(&series.points, date)?;
    let a = series.points[left].display_value();
    let b = series.points[right].display_value();
    Some(lerp(a, b, time_of_day_fraction(date)))
}

/// Legend rows for every non-empty series, highest value first. Ties keep source order.
pub fn legend_entries(series: &[Series], date: &NaiveDateTime) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = series
        .iter()
        .filter_map(|s| value_at(s, date).map(|value| LegendEntry { key: s.key.clone(), value }))
        .collect();
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries
}

pub fn legend_text(entry: &LegendEntry) -> String {
    format!("{} : {}", entry.key, format_integer(entry.value))
}

/// Bounding box of the legend contents (rows start at the padding offset).
pub fn legend_size(entries: &[LegendEntry], measure: &dyn TextMeasure) -> (f64, f64) {
    if entries.is_empty() {
        return (0.0, 0.0);
    }
    let text_w = entries
        .iter()
        .map(|e| measure.measure_width(&legend_text(e), LABEL_FONT_SIZE))
        .fold(0.0, f64::max);
    let width = LEGEND_TEXT_X + text_w;
    let height = (entries.len() - 1) as f64 * LEGEND_ROW_HEIGHT + LEGEND_SWATCH;
    (width, height)
}

/// Legend origin: beside the pointer, flipped to the other side past either midline.
pub fn legend_origin(pointer: Point, size: (f64, f64), layout: &Layout) -> Point {
    let x = if pointer.x <= layout.plot_width / 2.0 {
        pointer.x
    } else {
        pointer.x - size.0 - LEGEND_FLIP_GAP
    };
    let y = if pointer.y <= layout.plot_height / 2.0 {
        pointer.y
    } else {
        pointer.y - size.1 - LEGEND_FLIP_GAP
    };
    Point::new(x, y)
}

/// Hidden/visible state plus the last pointer position.
#[derive(Clone, Debug, Default)]
pub struct AnnotationEngine {
    visibility: Visibility,
    pointer: Option<Point>,
    legend: Vec<LegendEntry>,
}

impl AnnotationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Entries from the most recent layout.
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    /// Apply a pointer event. Returns whether the annotation needs relayout.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Enter => {
                self.visibility = Visibility::Visible;
                false
            }
            PointerEvent::Leave => {
                self.visibility = Visibility::Hidden;
                false
            }
            PointerEvent::Move { x, y } => {
                self.pointer = Some(Point::new(x, y));
                true
            }
        }
    }

    /// Lay out crosshair, markers and legend for the current pointer.
    pub fn layout(
        &mut self,
        series: &[Series],
        scales: &ScaleMapping,
        colors: &mut ColorScale,
        measure: &dyn TextMeasure,
        layout: &Layout,
    ) -> AnnotationLayer {
        let visible = self.visibility == Visibility::Visible;
        let Some(pointer) = self.pointer else {
            self.legend.clear();
            return AnnotationLayer { visible, ..AnnotationLayer::default() };
        };

        let date = scales.x.from_px(pointer.x);
        let markers = series
            .iter()
            .filter_map(|s| {
                let value = value_at(s, &date)?;
                Some(Marker {
                    key: s.key.clone(),
                    color: colors.color(&s.key),
                    center: Point::new(pointer.x, scales.y.to_px(value)),
                    radius: MARKER_RADIUS,
                })
            })
            .collect();

        let entries = legend_entries(series, &date);
        let size = legend_size(&entries, measure);
        let rows = entries
            .iter()
            .enumerate()
            .map(|(i, e)| LegendRow {
                key: e.key.clone(),
                color: colors.color(&e.key),
                text: legend_text(e),
                offset: Point::new(LEGEND_PADDING, LEGEND_PADDING + i as f64 * LEGEND_ROW_HEIGHT),
            })
            .collect();
        self.legend = entries;

        AnnotationLayer {
            visible,
            crosshair: Some((Point::new(pointer.x, 0.0), Point::new(pointer.x, layout.plot_height))),
            markers,
            legend: Legend {
                origin: legend_origin(pointer, size, layout),
                width: size.0,
                height: size.1,
                rows,
            },
        }
    }
}

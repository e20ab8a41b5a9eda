// File: crates/chart-core/src/axis.rs
// Summary: Axis models (bottom time axis, left value axis, horizontal grid) derived from the scales.

use crate::grid::time_tick_label;
use crate::scale::{TimeScale, ValueScale};

/// Tick count requested for the value axis and its grid.
pub const Y_TICK_COUNT: usize = 6;
/// Tick count requested for the time axis.
pub const X_TICK_COUNT: usize = 10;
/// Length of the outward tick marks.
pub const TICK_SIZE: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orient {
    Bottom,
    Left,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Position along the axis in plot pixels.
    pub offset: f64,
    /// `None` for unlabelled grid ticks.
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub class: &'static str,
    pub orient: Orient,
    /// Translation of the axis group inside the plot group.
    pub translate: (f64, f64),
    /// Pixel extent of the axis line.
    pub range: (f64, f64),
    /// Tick line length; negative values draw across the plot.
    pub tick_size: f64,
    pub ticks: Vec<Tick>,
    pub show_domain: bool,
}

impl Axis {
    pub fn bottom_time(x: &TimeScale, plot_height: f64) -> Self {
        let ticks = x
            .ticks(X_TICK_COUNT)
            .into_iter()
            .map(|t| Tick { offset: x.to_px(&t), label: Some(time_tick_label(&t)) })
            .collect();
        Self {
            class: "x axis",
            orient: Orient::Bottom,
            translate: (0.0, plot_height),
            range: (x.left_px, x.right_px),
            tick_size: TICK_SIZE,
            ticks,
            show_domain: true,
        }
    }

    pub fn left_value(y: &ValueScale) -> Self {
        let ticks = y
            .labelled_ticks(Y_TICK_COUNT)
            .into_iter()
            .map(|(v, label)| Tick { offset: y.to_px(v), label: Some(label) })
            .collect();
        Self {
            class: "y axis",
            orient: Orient::Left,
            translate: (0.0, 0.0),
            range: (y.bottom_px, y.top_px),
            tick_size: TICK_SIZE,
            ticks,
            show_domain: true,
        }
    }

    /// Background grid: the value ticks stretched across the plot width, unlabelled.
    pub fn left_grid(y: &ValueScale, plot_width: f64) -> Self {
        let ticks = y
            .ticks(Y_TICK_COUNT)
            .into_iter()
            .map(|v| Tick { offset: y.to_px(v), label: None })
            .collect();
        Self {
            class: "y axis_grid",
            orient: Orient::Left,
            translate: (0.0, 0.0),
            range: (y.bottom_px, y.top_px),
            tick_size: -plot_width,
            ticks,
            show_domain: false,
        }
    }
}

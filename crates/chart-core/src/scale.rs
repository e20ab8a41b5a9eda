// File: crates/chart-core/src/scale.rs
// Summary: Time (X) and value (Y) scale transforms, the scale mode selector, and the shared scale builder.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};

use crate::grid::{format_integer, linear_ticks, log_tick_labels, log_ticks, time_ticks};
use crate::series::Series;
use crate::types::Layout;

/// Lower bound of the value domain in both modes.
pub const VALUE_FLOOR: f64 = 0.1;

const LOG_EPS: f64 = 1e-12;

/// Y-axis mode as exposed by the view's `lin`/`log` selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleMode {
    Linear,
    #[default]
    Log,
}

impl ScaleMode {
    /// Selector value; anything unrecognised (or unset) is log.
    pub fn from_selector(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("lin") => ScaleMode::Linear,
            _ => ScaleMode::Log,
        }
    }

    pub fn as_selector(&self) -> &'static str {
        match self {
            ScaleMode::Linear => "lin",
            ScaleMode::Log => "log",
        }
    }
}

impl FromStr for ScaleMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_selector(Some(s)))
    }
}

impl std::fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_selector())
    }
}

pub fn to_millis(t: &NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

pub fn from_millis(ms: i64) -> NaiveDateTime {
    DateTime::from_timestamp_millis(ms).map(|d| d.naive_utc()).unwrap_or_default()
}

/// Horizontal time scale: linear in milliseconds between the domain ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub left_px: f64,
    pub right_px: f64,
    start_ms: f64,
    end_ms: f64,
}

impl TimeScale {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, left_px: f64, right_px: f64) -> Self {
        Self {
            left_px,
            right_px,
            start_ms: to_millis(&start) as f64,
            end_ms: to_millis(&end) as f64,
        }
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        (from_millis(self.start_ms as i64), from_millis(self.end_ms as i64))
    }

    #[inline]
    pub fn to_px(&self, t: &NaiveDateTime) -> f64 {
        self.ms_to_px(to_millis(t) as f64)
    }

    #[inline]
    pub fn ms_to_px(&self, ms: f64) -> f64 {
        let span = self.end_ms - self.start_ms;
        if span == 0.0 {
            return (self.left_px + self.right_px) * 0.5;
        }
        self.left_px + (ms - self.start_ms) / span * (self.right_px - self.left_px)
    }

    /// Inverse mapping; pixels outside the range extrapolate.
    #[inline]
    pub fn from_px(&self, px: f64) -> NaiveDateTime {
        let width = self.right_px - self.left_px;
        if width == 0.0 {
            return from_millis(self.start_ms as i64);
        }
        let ms = self.start_ms + (px - self.left_px) / width * (self.end_ms - self.start_ms);
        from_millis(ms.round() as i64)
    }

    pub fn ticks(&self, count: usize) -> Vec<NaiveDateTime> {
        let (start, end) = self.domain();
        time_ticks(start, end, count)
    }
}

/// Vertical value scale mapping data range to [top, bottom] pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
    pub top_px: f64,
    pub bottom_px: f64,
    pub vmin: f64,
    pub vmax: f64,
    pub mode: ScaleMode,
    // cached log endpoints when mode is Log
    log_min: f64,
    log_max: f64,
}

impl ValueScale {
    pub fn new(mode: ScaleMode, top_px: f64, bottom_px: f64, vmin: f64, vmax: f64) -> Self {
        match mode {
            ScaleMode::Linear => Self::new_linear(top_px, bottom_px, vmin, vmax),
            ScaleMode::Log => Self::new_log10(top_px, bottom_px, vmin, vmax),
        }
    }

    pub fn new_linear(top_px: f64, bottom_px: f64, vmin: f64, vmax: f64) -> Self {
        let mut s = Self { top_px, bottom_px, vmin, vmax, mode: ScaleMode::Linear, log_min: 0.0, log_max: 0.0 };
        if !(s.vmax - s.vmin).is_finite() || (s.vmax - s.vmin).abs() < 1e-12 {
            s.vmax = s.vmin + 1.0;
        }
        s
    }

    pub fn new_log10(top_px: f64, bottom_px: f64, mut vmin: f64, mut vmax: f64) -> Self {
        // Ensure strictly positive range for log scale
        vmin = if vmin <= LOG_EPS { LOG_EPS } else { vmin };
        vmax = if !(vmax > vmin) { vmin * 10.0 } else { vmax };
        let log_min = vmin.log10();
        let log_max = vmax.log10();
        Self { top_px, bottom_px, vmin, vmax, mode: ScaleMode::Log, log_min, log_max }
    }

    #[inline]
    pub fn to_px(&self, y: f64) -> f64 {
        let height = self.bottom_px - self.top_px;
        match self.mode {
            ScaleMode::Log => {
                let yy = y.max(LOG_EPS).log10();
                self.bottom_px - (yy - self.log_min) / (self.log_max - self.log_min) * height
            }
            ScaleMode::Linear => self.bottom_px - (y - self.vmin) / (self.vmax - self.vmin) * height,
        }
    }

    #[inline]
    pub fn from_px(&self, py: f64) -> f64 {
        let height = self.bottom_px - self.top_px;
        if height == 0.0 {
            return self.vmin;
        }
        let frac = (self.bottom_px - py) / height;
        match self.mode {
            ScaleMode::Log => 10f64.powf(self.log_min + frac * (self.log_max - self.log_min)),
            ScaleMode::Linear => self.vmin + frac * (self.vmax - self.vmin),
        }
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self.mode {
            ScaleMode::Linear => linear_ticks(self.vmin, self.vmax, count),
            ScaleMode::Log => log_ticks(self.vmin, self.vmax, count),
        }
    }

    /// Ticks paired with integer labels; log mode blanks crowded labels.
    pub fn labelled_ticks(&self, count: usize) -> Vec<(f64, String)> {
        let ticks = self.ticks(count);
        let labels = match self.mode {
            ScaleMode::Linear => ticks.iter().map(|&v| format_integer(v)).collect(),
            ScaleMode::Log => log_tick_labels(self.vmin, self.vmax, &ticks, count),
        };
        ticks.into_iter().zip(labels).collect()
    }
}

/// The chart's pair of mappings, rebuilt on every refresh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleMapping {
    pub x: TimeScale,
    pub y: ValueScale,
}

/// Build the shared mapping.
///
/// The time domain spans the first series only (first non-empty one if the
/// first has no points); series with other date ranges are not considered.
/// The value domain tops out at the largest *last* display value, not the
/// largest value overall.
pub fn build_scales(series: &[Series], mode: ScaleMode, layout: &Layout, fallback_start: NaiveDateTime) -> ScaleMapping {
    let reference = series
        .first()
        .filter(|s| !s.is_empty())
        .or_else(|| series.iter().find(|s| !s.is_empty()));
    let (start, end) = match reference.and_then(|s| Some((s.first()?.date, s.last()?.date))) {
        Some(span) => span,
        None => (fallback_start, fallback_start + chrono::Duration::days(1)),
    };

    let vmax = series
        .iter()
        .filter_map(Series::last)
        .map(|p| p.display_value())
        .fold(f64::NEG_INFINITY, f64::max);

    ScaleMapping {
        x: TimeScale::new(start, end, 0.0, layout.plot_width),
        y: ValueScale::new(mode, 0.0, layout.plot_height, VALUE_FLOOR, vmax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::DataPoint;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 4, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn series(key: &str, points: &[(u32, f64)]) -> Series {
        Series::new(
            key,
            points.iter().map(|&(d, v)| DataPoint { date: day(d), confirmed: v, suspected: 0.0 }).collect(),
        )
    }

    #[test]
    fn selector_defaults_to_log() {
        assert_eq!(ScaleMode::from_selector(Some("lin")), ScaleMode::Linear);
        assert_eq!(ScaleMode::from_selector(Some("log")), ScaleMode::Log);
        assert_eq!(ScaleMode::from_selector(Some("sqrt")), ScaleMode::Log);
        assert_eq!(ScaleMode::from_selector(None), ScaleMode::Log);
        assert_eq!("lin".parse::<ScaleMode>().unwrap(), ScaleMode::Linear);
    }

    #[test]
    fn time_scale_maps_and_inverts() {
        let x = TimeScale::new(day(1), day(11), 0.0, 1000.0);
        assert_relative_eq!(x.to_px(&day(6)), 500.0);
        assert_eq!(x.from_px(500.0), day(6));
        // extrapolates past the right edge
        assert_eq!(x.from_px(1100.0), day(12));
    }

    #[test]
    fn degenerate_time_domain_maps_to_the_middle() {
        let x = TimeScale::new(day(3), day(3), 0.0, 1100.0);
        assert_relative_eq!(x.to_px(&day(3)), 550.0);
        assert_eq!(x.from_px(10.0), day(3));
    }

    #[test]
    fn linear_value_scale_is_inverted_vertically() {
        let y = ValueScale::new_linear(0.0, 500.0, 0.0, 100.0);
        assert_relative_eq!(y.to_px(0.0), 500.0);
        assert_relative_eq!(y.to_px(100.0), 0.0);
        assert_relative_eq!(y.from_px(250.0), 50.0);
    }

    #[test]
    fn log_value_scale_spaces_decades_evenly() {
        let y = ValueScale::new_log10(0.0, 500.0, 0.1, 1000.0);
        assert_relative_eq!(y.to_px(0.1), 500.0);
        assert_relative_eq!(y.to_px(1.0), 375.0);
        assert_relative_eq!(y.to_px(1000.0), 0.0);
        assert_relative_eq!(y.from_px(375.0), 1.0, max_relative = 1e-12);
        // non-positive values clamp instead of producing NaN
        assert!(y.to_px(0.0).is_finite());
    }

    #[test]
    fn domain_is_anchored_to_the_first_series() {
        let s = vec![series("A", &[(3, 1.0), (5, 4.0)]), series("B", &[(1, 2.0), (9, 50.0)])];
        let m = build_scales(&s, ScaleMode::Linear, &Layout::default(), day(1));
        assert_eq!(m.x.domain(), (day(3), day(5)));
        assert_eq!(m.y.vmin, VALUE_FLOOR);
        assert_eq!(m.y.vmax, 50.0);
    }

    #[test]
    fn value_domain_uses_last_points_only() {
        // B peaks at 90 mid-series but ends at 20.
        let s = vec![series("A", &[(1, 1.0), (2, 10.0)]), series("B", &[(1, 90.0), (2, 20.0)])];
        let m = build_scales(&s, ScaleMode::Log, &Layout::default(), day(1));
        assert_eq!(m.y.vmax, 20.0);
    }

    #[test]
    fn empty_first_series_falls_back_to_next_non_empty() {
        let s = vec![series("A", &[]), series("B", &[(2, 1.0), (4, 2.0)])];
        let m = build_scales(&s, ScaleMode::Log, &Layout::default(), day(1));
        assert_eq!(m.x.domain(), (day(2), day(4)));
    }

    #[test]
    fn no_points_anywhere_still_builds_total_scales() {
        let m = build_scales(&[], ScaleMode::Log, &Layout::default(), day(1));
        assert_eq!(m.x.domain(), (day(1), day(2)));
        assert!(m.y.vmax > m.y.vmin);
        assert!(m.y.to_px(5.0).is_finite());
    }
}

// File: crates/chart-core/src/types.rs
// Summary: Shared types and constants (surface size, margins, plot area).

/// Logical surface width in pixels (SVG viewBox width).
pub const WIDTH: f64 = 1200.0;
/// Logical surface height in pixels (SVG viewBox height).
pub const HEIGHT: f64 = 600.0;

/// Plot area width inside the margins.
pub const PLOT_WIDTH: f64 = 1100.0;
/// Plot area height inside the margins.
pub const PLOT_HEIGHT: f64 = 500.0;

/// Offset of the plot group from the surface origin, in pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
}

impl Insets {
    /// Create new insets (non-negative by type).
    pub const fn new(left: u32, top: u32) -> Self {
        Self { left, top }
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(50, 50)
    }
}

/// Logical surface layout: total size, plot offset and plot size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub insets: Insets,
    pub plot_width: f64,
    pub plot_height: f64,
}

impl Layout {
    /// Surface of `width`×`height` with an equal `margin` on every side.
    pub fn from_surface(width: f64, height: f64, margin: u32) -> Self {
        let m = margin as f64;
        Self {
            width,
            height,
            insets: Insets::new(margin, margin),
            plot_width: (width - 2.0 * m).max(1.0),
            plot_height: (height - 2.0 * m).max(1.0),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            insets: Insets::default(),
            plot_width: PLOT_WIDTH,
            plot_height: PLOT_HEIGHT,
        }
    }
}

/// Maps container pixels onto the logical surface the way
/// `preserveAspectRatio="xMinYMin meet"` does: uniform scale, anchored top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub container_width: f64,
    pub container_height: f64,
}

impl Viewport {
    pub fn new(container_width: f64, container_height: f64) -> Self {
        Self { container_width, container_height }
    }

    /// Uniform scale factor from logical units to container pixels.
    pub fn scale(&self, layout: &Layout) -> f64 {
        let sx = self.container_width / layout.width;
        let sy = self.container_height / layout.height;
        let s = sx.min(sy);
        if s.is_finite() && s > 0.0 { s } else { 1.0 }
    }

    /// Convert a container pixel position into plot-area coordinates.
    pub fn to_plot(&self, layout: &Layout, px: f64, py: f64) -> (f64, f64) {
        let s = self.scale(layout);
        (
            px / s - layout.insets.left as f64,
            py / s - layout.insets.top as f64,
        )
    }
}

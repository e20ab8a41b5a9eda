// File: crates/chart-render-skia/src/lib.rs
// Summary: Headless PNG rendering of a chart-core Scene using Skia CPU raster surfaces.

use std::path::Path;

use chart_core::axis::{Axis, Orient};
use chart_core::error::{ChartError, ChartResult};
use chart_core::scene::{AnnotationLayer, Scene, Spinner};
use chart_core::svg::SPINNER_RADIUS;
use chart_core::text::{AXIS_FONT_SIZE, LABEL_FONT_SIZE};
use chart_core::theme::{Color, Theme};
use skia_safe as skia;

pub mod text;

pub use text::TextShaper;

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Device pixels per logical pixel.
    pub scale: f32,
    /// Axis and legend text; off for pixel-stable snapshots.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { scale: 1.0, draw_labels: true }
    }
}

fn sk(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn stroke(color: Color, width: f32) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(width);
    paint.set_color(sk(color));
    paint
}

fn fill(color: Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(sk(color));
    paint
}

pub struct SkiaRenderer {
    shaper: TextShaper,
}

impl Default for SkiaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaRenderer {
    pub fn new() -> Self {
        Self { shaper: TextShaper::new() }
    }

    /// Rasterise the scene and return encoded PNG bytes.
    pub fn render_png_bytes(&self, scene: &Scene, opts: &RenderOptions) -> ChartResult<Vec<u8>> {
        let layout = &scene.layout;
        let scale = opts.scale.max(0.1);
        let w = (layout.width as f32 * scale).round() as i32;
        let h = (layout.height as f32 * scale).round() as i32;

        let mut surface = skia::surfaces::raster_n32_premul((w.max(1), h.max(1)))
            .ok_or_else(|| ChartError::Render("failed to create raster surface".into()))?;
        let canvas = surface.canvas();
        canvas.scale((scale, scale));
        canvas.clear(sk(scene.theme.background));

        canvas.save();
        canvas.translate((layout.insets.left as f32, layout.insets.top as f32));
        for axis in &scene.axes {
            self.draw_axis(canvas, axis, &scene.theme, opts);
        }
        for path in scene.series.values() {
            let Some((first, rest)) = path.points.split_first() else { continue };
            let mut sk_path = skia::Path::new();
            sk_path.move_to((first.x as f32, first.y as f32));
            for p in rest {
                sk_path.line_to((p.x as f32, p.y as f32));
            }
            canvas.draw_path(&sk_path, &stroke(path.color, 1.5));
        }
        if scene.annotation.visible {
            self.draw_annotation(canvas, &scene.annotation, &scene.theme, opts);
        }
        canvas.restore();

        draw_spinner(canvas, scene);

        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| ChartError::Render("encode PNG failed".into()))?;
        tracing::debug!(bytes = data.len(), width = w, height = h, "scene rasterised");
        Ok(data.as_bytes().to_vec())
    }

    pub fn render_to_png(&self, scene: &Scene, opts: &RenderOptions, output_png_path: impl AsRef<Path>) -> ChartResult<()> {
        let bytes = self.render_png_bytes(scene, opts)?;
        if let Some(parent) = output_png_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ChartError::Render(e.to_string()))?;
        }
        std::fs::write(output_png_path, bytes).map_err(|e| ChartError::Render(e.to_string()))
    }

    fn draw_axis(&self, canvas: &skia::Canvas, axis: &Axis, theme: &Theme, opts: &RenderOptions) {
        let grid = !axis.show_domain;
        let line = stroke(if grid { theme.grid } else { theme.axis_line }, 1.0);
        let (tx, ty) = (axis.translate.0 as f32, axis.translate.1 as f32);
        let k = axis.tick_size as f32;
        let (r0, r1) = (axis.range.0 as f32, axis.range.1 as f32);

        if axis.show_domain {
            match axis.orient {
                Orient::Bottom => canvas.draw_line((tx + r0, ty), (tx + r1, ty), &line),
                Orient::Left => canvas.draw_line((tx, ty + r0), (tx, ty + r1), &line),
            };
        }

        let label_color = sk(theme.axis_label);
        let spacing = k.max(0.0) + 3.0;
        for tick in &axis.ticks {
            let o = tick.offset as f32;
            match axis.orient {
                Orient::Bottom => {
                    canvas.draw_line((tx + o, ty), (tx + o, ty + k), &line);
                    if let (true, Some(label)) = (opts.draw_labels, &tick.label) {
                        self.shaper.draw_centered(canvas, label, tx + o, ty + spacing, AXIS_FONT_SIZE as f32, label_color);
                    }
                }
                Orient::Left => {
                    canvas.draw_line((tx, ty + o), (tx - k, ty + o), &line);
                    if let (true, Some(label)) = (opts.draw_labels, &tick.label) {
                        self.shaper.draw_right_aligned(canvas, label, tx - spacing, ty + o, AXIS_FONT_SIZE as f32, label_color);
                    }
                }
            }
        }
    }

    fn draw_annotation(&self, canvas: &skia::Canvas, layer: &AnnotationLayer, theme: &Theme, opts: &RenderOptions) {
        if let Some((top, bottom)) = layer.crosshair {
            canvas.draw_line((top.x as f32, top.y as f32), (bottom.x as f32, bottom.y as f32), &stroke(theme.crosshair, 1.0));
        }
        for m in &layer.markers {
            canvas.draw_circle((m.center.x as f32, m.center.y as f32), m.radius as f32, &fill(m.color));
        }

        let legend = &layer.legend;
        let (ox, oy) = (legend.origin.x as f32, legend.origin.y as f32);
        for row in &legend.rows {
            let (rx, ry) = (ox + row.offset.x as f32, oy + row.offset.y as f32);
            canvas.draw_rect(skia::Rect::from_xywh(rx, ry, 20.0, 20.0), &fill(row.color));
            if opts.draw_labels {
                self.shaper.draw_top_left(canvas, &row.text, rx + 30.0, ry, LABEL_FONT_SIZE as f32, sk(theme.legend_text));
            }
        }
    }
}

/// Static frame of the ripple; rings at full and half radius.
fn draw_spinner(canvas: &skia::Canvas, scene: &Scene) {
    let color = match scene.spinner {
        Spinner::Hidden => return,
        Spinner::Spinning => scene.theme.spinner,
        Spinner::Failed => scene.theme.spinner_error,
    };
    let center = ((scene.layout.width / 2.0) as f32, (scene.layout.height / 2.0) as f32);
    let ring = stroke(color, 4.0);
    canvas.draw_circle(center, SPINNER_RADIUS as f32, &ring);
    canvas.draw_circle(center, (SPINNER_RADIUS / 2.0) as f32, &ring);
}

/// Render with default options.
pub fn render_png_bytes(scene: &Scene) -> ChartResult<Vec<u8>> {
    SkiaRenderer::new().render_png_bytes(scene, &RenderOptions::default())
}

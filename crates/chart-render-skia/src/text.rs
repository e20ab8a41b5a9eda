// File: crates/chart-render-skia/src/text.rs
// Summary: Text shaper/renderer using Skia textlayout; also measures legend text for the core layout.

use chart_core::text::TextMeasure;
use skia::textlayout::{FontCollection, Paragraph, ParagraphBuilder, ParagraphStyle, TextStyle};
use skia_safe as skia;

pub struct TextShaper {
    fonts: FontCollection,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    pub fn new() -> Self {
        let mut fc = FontCollection::new();
        // Use system manager fallback
        fc.set_default_font_manager(skia::FontMgr::default(), None);
        Self { fonts: fc }
    }

    fn make_style(size: f32, color: skia::Color) -> TextStyle {
        let mut ts = TextStyle::new();
        ts.set_font_size(size.max(1.0));
        ts.set_color(color);
        ts.set_font_families(&["Segoe UI", "Arial", "Helvetica", "Roboto", "DejaVu Sans", "sans-serif"]);
        ts
    }

    pub fn layout(&self, text: &str, size: f32, color: skia::Color) -> Paragraph {
        let mut pstyle = ParagraphStyle::new();
        pstyle.set_text_align(skia::textlayout::TextAlign::Left);
        let mut builder = ParagraphBuilder::new(&pstyle, &self.fonts);
        builder.push_style(&Self::make_style(size, color));
        builder.add_text(text);
        let mut paragraph = builder.build();
        paragraph.layout(10_000.0);
        paragraph
    }

    pub fn measure(&self, text: &str, size: f32) -> f32 {
        self.layout(text, size, skia::Color::TRANSPARENT).longest_line()
    }

    /// Draw with the top-left corner at `(x, y)`.
    pub fn draw_top_left(&self, canvas: &skia::Canvas, text: &str, x: f32, y: f32, size: f32, color: skia::Color) {
        let p = self.layout(text, size, color);
        p.paint(canvas, (x, y));
    }

    /// Draw vertically centred on `y`, ending at `right`.
    pub fn draw_right_aligned(&self, canvas: &skia::Canvas, text: &str, right: f32, y: f32, size: f32, color: skia::Color) {
        let p = self.layout(text, size, color);
        p.paint(canvas, (right - p.longest_line(), y - p.height() * 0.5));
    }

    /// Draw horizontally centred on `x` with the top at `y`.
    pub fn draw_centered(&self, canvas: &skia::Canvas, text: &str, x: f32, y: f32, size: f32, color: skia::Color) {
        let p = self.layout(text, size, color);
        p.paint(canvas, (x - p.longest_line() * 0.5, y));
    }
}

impl TextMeasure for TextShaper {
    fn measure_width(&self, text: &str, size: f64) -> f64 {
        self.measure(text, size as f32) as f64
    }
}

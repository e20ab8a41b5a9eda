// File: crates/chart-core/src/text.rs
// Summary: Text measurement seam used to size the legend box; a font-free estimate by default.

/// Font size of legend rows and axis labels, in logical pixels.
pub const LABEL_FONT_SIZE: f64 = 16.0;
pub const AXIS_FONT_SIZE: f64 = 10.0;

/// Width of a single line of text. Raster backends can supply real shaping.
pub trait TextMeasure {
    fn measure_width(&self, text: &str, size: f64) -> f64;
}

/// Average-advance estimate for a proportional sans-serif face.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure_width(&self, text: &str, size: f64) -> f64 {
        text.chars()
            .map(|c| match c {
                ' ' | '.' | ',' | ':' | 'i' | 'l' | 'j' | 'I' | '1' => 0.3,
                'm' | 'w' | 'M' | 'W' => 0.85,
                c if c.is_ascii_uppercase() => 0.65,
                _ => 0.55,
            })
            .sum::<f64>()
            * size
    }
}

/// Escape text for XML content and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

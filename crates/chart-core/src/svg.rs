// File: crates/chart-core/src/svg.rs
// Summary: Serialises a Scene to an SVG document (viewBox surface, plot group, axes, paths, annotation, spinner).

use std::fmt::Write;

use crate::axis::{Axis, Orient};
use crate::error::{ChartError, ChartResult};
use crate::geometry::Point;
use crate::scene::{AnnotationLayer, Scene, Spinner};
use crate::text::{escape_xml, AXIS_FONT_SIZE, LABEL_FONT_SIZE};
use crate::theme::{Color, Theme};

/// Outer radius of the ripple rings.
pub const SPINNER_RADIUS: f64 = 36.0;

/// SVG path data: `M x,y L x,y ...` with two decimals.
#[derive(Clone, Debug, Default)]
pub struct PathData {
    commands: String,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "M{:.2},{:.2}", x, y);
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.commands, "L{:.2},{:.2}", x, y);
        self
    }

    pub fn h(mut self, x: f64) -> Self {
        let _ = write!(self.commands, "H{:.2}", x);
        self
    }

    pub fn v(mut self, y: f64) -> Self {
        let _ = write!(self.commands, "V{:.2}", y);
        self
    }

    /// Polyline through `points`; empty input gives empty data.
    pub fn polyline(points: &[Point]) -> Self {
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Self::new();
        };
        iter.fold(Self::new().move_to(first.x, first.y), |d, p| d.line_to(p.x, p.y))
    }

    pub fn build(self) -> String {
        self.commands
    }
}

fn paint(color: Color) -> String {
    color.hex()
}

/// Render the whole scene as a standalone SVG document.
pub fn render(scene: &Scene) -> ChartResult<String> {
    write_document(scene).map_err(|e| ChartError::Render(format!("svg serialisation failed: {e}")))
}

fn write_document(scene: &Scene) -> Result<String, std::fmt::Error> {
    let layout = &scene.layout;
    let theme = &scene.theme;
    let mut out = String::with_capacity(16 * 1024);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" preserveAspectRatio="xMinYMin meet" class="chart" font-family="sans-serif">"#,
        w = layout.width,
        h = layout.height
    )?;
    writeln!(
        out,
        r#"<rect class="chart" x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        layout.width,
        layout.height,
        paint(theme.background)
    )?;
    writeln!(out, r#"<g transform="translate({},{})">"#, layout.insets.left, layout.insets.top)?;

    for axis in &scene.axes {
        write_axis(&mut out, axis, theme)?;
    }

    writeln!(out, r#"<g class="series" fill="none" stroke-width="1.5">"#)?;
    for path in scene.series.values() {
        writeln!(
            out,
            r#"<path id="line-{}" class="line" data-key="{}" stroke="{}" d="{}"/>"#,
            path.id,
            escape_xml(&path.key),
            paint(path.color),
            PathData::polyline(&path.points).build()
        )?;
    }
    writeln!(out, "</g>")?;

    if let Some(overlay) = &scene.overlay {
        writeln!(
            out,
            r#"<rect class="overlay" x="{}" y="{}" width="{}" height="{}" fill="none" pointer-events="all"/>"#,
            overlay.rect.left, overlay.rect.top, overlay.rect.width, overlay.rect.height
        )?;
    }

    write_annotation(&mut out, &scene.annotation, theme)?;
    writeln!(out, "</g>")?;

    write_spinner(&mut out, scene)?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn write_axis(out: &mut String, axis: &Axis, theme: &Theme) -> std::fmt::Result {
    let grid = !axis.show_domain;
    let stroke = paint(if grid { theme.grid } else { theme.axis_line });
    let anchor = match axis.orient {
        Orient::Bottom => "middle",
        Orient::Left => "end",
    };
    writeln!(
        out,
        r#"<g class="{}" transform="translate({},{})" fill="none" font-size="{}" text-anchor="{}">"#,
        axis.class, axis.translate.0, axis.translate.1, AXIS_FONT_SIZE, anchor
    )?;

    if axis.show_domain {
        let (r0, r1) = axis.range;
        let k = axis.tick_size;
        let d = match axis.orient {
            Orient::Bottom => PathData::new().move_to(r0, k).v(0.0).h(r1).v(k),
            Orient::Left => PathData::new().move_to(-k, r0).h(0.0).v(r1).h(-k),
        };
        writeln!(out, r#"<path class="domain" stroke="{}" d="{}"/>"#, stroke, d.build())?;
    }

    let spacing = axis.tick_size.max(0.0) + 3.0;
    for tick in &axis.ticks {
        match axis.orient {
            Orient::Bottom => {
                write!(out, r#"<g class="tick" transform="translate({:.2},0)">"#, tick.offset)?;
                write!(out, r#"<line stroke="{}" y2="{}"/>"#, stroke, axis.tick_size)?;
                if let Some(label) = &tick.label {
                    write!(
                        out,
                        r#"<text fill="{}" y="{}" dy="0.71em">{}</text>"#,
                        paint(theme.axis_label),
                        spacing,
                        escape_xml(label)
                    )?;
                }
            }
            Orient::Left => {
                write!(out, r#"<g class="tick" transform="translate(0,{:.2})">"#, tick.offset)?;
                write!(out, r#"<line stroke="{}" x2="{}"/>"#, stroke, -axis.tick_size)?;
                if let Some(label) = &tick.label {
                    write!(
                        out,
                        r#"<text fill="{}" x="{}" dy="0.32em">{}</text>"#,
                        paint(theme.axis_label),
                        -spacing,
                        escape_xml(label)
                    )?;
                }
            }
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</g>")
}

fn write_annotation(out: &mut String, layer: &AnnotationLayer, theme: &Theme) -> std::fmt::Result {
    let display = if layer.visible { "inline" } else { "none" };
    writeln!(out, r#"<g class="annotation" pointer-events="none" display="{display}">"#)?;

    if let Some((top, bottom)) = layer.crosshair {
        let d = PathData::new().move_to(top.x, top.y).line_to(bottom.x, bottom.y);
        writeln!(
            out,
            r#"<path class="x_intercept" fill="none" stroke="{}" stroke-width="1" d="{}"/>"#,
            paint(theme.crosshair),
            d.build()
        )?;
    }
    for marker in &layer.markers {
        writeln!(
            out,
            r#"<circle data-key="{}" cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
            escape_xml(&marker.key),
            marker.center.x,
            marker.center.y,
            marker.radius,
            paint(marker.color)
        )?;
    }

    let legend = &layer.legend;
    if !legend.rows.is_empty() {
        writeln!(
            out,
            r#"<g class="legend" transform="translate({:.2},{:.2})" font-size="{}">"#,
            legend.origin.x, legend.origin.y, LABEL_FONT_SIZE
        )?;
        for row in &legend.rows {
            writeln!(
                out,
                r#"<g class="legend-row" transform="translate({},{})"><rect width="20" height="20" fill="{}"/><text x="30" y="1em" fill="{}">{}</text></g>"#,
                row.offset.x,
                row.offset.y,
                paint(row.color),
                paint(theme.legend_text),
                escape_xml(&row.text)
            )?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</g>")
}

fn write_spinner(out: &mut String, scene: &Scene) -> std::fmt::Result {
    let (class, color, animate) = match scene.spinner {
        Spinner::Hidden => return Ok(()),
        Spinner::Spinning => ("lds-ripple", scene.theme.spinner, true),
        Spinner::Failed => ("lds-ripple paused", scene.theme.spinner_error, false),
    };
    writeln!(
        out,
        r#"<g id="spinner" class="{}" transform="translate({},{})" fill="none" stroke="{}" stroke-width="4">"#,
        class,
        scene.layout.width / 2.0,
        scene.layout.height / 2.0,
        paint(color)
    )?;
    for begin in ["0s", "-0.5s"] {
        if animate {
            writeln!(
                out,
                r#"<circle r="0"><animate attributeName="r" from="0" to="{r}" dur="1s" begin="{begin}" repeatCount="indefinite"/><animate attributeName="opacity" from="1" to="0" dur="1s" begin="{begin}" repeatCount="indefinite"/></circle>"#,
                r = SPINNER_RADIUS
            )?;
        } else {
            let r = if begin == "0s" { SPINNER_RADIUS } else { SPINNER_RADIUS / 2.0 };
            writeln!(out, r#"<circle r="{r}"/>"#)?;
        }
    }
    writeln!(out, "</g>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PathUpdate;
    use crate::theme::TABLEAU10;
    use crate::types::Layout;

    #[test]
    fn polyline_uses_two_decimals() {
        let d = PathData::polyline(&[Point::new(0.0, 1.0), Point::new(2.5, 3.333)]).build();
        assert_eq!(d, "M0.00,1.00L2.50,3.33");
        assert!(PathData::polyline(&[]).build().is_empty());
    }

    #[test]
    fn empty_scene_has_surface_and_hidden_annotation() {
        let scene = Scene::new(Layout::default(), Theme::default());
        let svg = render(&scene).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 1200 600""#));
        assert!(svg.contains(r#"preserveAspectRatio="xMinYMin meet""#));
        assert!(svg.contains(r#"<g transform="translate(50,50)">"#));
        assert!(svg.contains(r#"display="none""#));
        assert!(!svg.contains("spinner"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn keys_are_escaped_and_spinner_styles_follow_state() {
        let mut scene = Scene::new(Layout::default(), Theme::default());
        scene.join_series(vec![PathUpdate {
            key: "A&B".into(),
            color: TABLEAU10[1],
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        }]);
        scene.spinner = Spinner::Spinning;
        let svg = render(&scene).unwrap();
        assert!(svg.contains(r#"data-key="A&amp;B""#));
        assert!(svg.contains("<animate"));

        scene.spinner = Spinner::Failed;
        let svg = render(&scene).unwrap();
        assert!(svg.contains("lds-ripple paused"));
        assert!(svg.contains("#ff0000"));
        assert!(!svg.contains("<animate"));
    }

    #[test]
    fn crosshair_runs_from_plot_top_to_bottom() {
        let mut scene = Scene::new(Layout::default(), Theme::default());
        scene.annotation.visible = true;
        scene.annotation.crosshair = Some((Point::new(300.0, 0.0), Point::new(300.0, 500.0)));
        let svg = render(&scene).unwrap();
        assert!(svg.contains(r#"display="inline""#));
        assert!(svg.contains(r##"class="x_intercept" fill="none" stroke="#787882" stroke-width="1" d="M300.00,0.00L300.00,500.00""##));
    }
}

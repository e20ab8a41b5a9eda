// File: crates/chart-core/src/scene.rs
// Summary: Retained scene graph: axes, keyed series paths, pointer overlay, annotation layer and spinner.
// Notes:
// - Series paths are joined by county key. A refresh updates surviving paths
//   in place, appends new ones and removes missing ones; an updated path keeps
//   its `id`.

use indexmap::IndexMap;

use crate::axis::Axis;
use crate::geometry::{Point, Rect};
use crate::theme::{Color, Theme};
use crate::types::Layout;

#[derive(Clone, Debug, PartialEq)]
pub struct LinePath {
    pub id: u64,
    pub key: String,
    pub color: Color,
    pub points: Vec<Point>,
}

/// Transparent rect over the plot that receives pointer events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overlay {
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub key: String,
    pub color: Color,
    pub center: Point,
    pub radius: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegendRow {
    pub key: String,
    pub color: Color,
    pub text: String,
    /// Row origin relative to the legend origin.
    pub offset: Point,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Legend {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub rows: Vec<LegendRow>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationLayer {
    pub visible: bool,
    /// Vertical crosshair segment in plot coordinates.
    pub crosshair: Option<(Point, Point)>,
    pub markers: Vec<Marker>,
    pub legend: Legend,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Spinner {
    #[default]
    Hidden,
    Spinning,
    /// Error styling: paused, red.
    Failed,
}

/// Result of a keyed series join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneDiff {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub layout: Layout,
    pub theme: Theme,
    pub spinner: Spinner,
    pub axes: Vec<Axis>,
    pub series: IndexMap<String, LinePath>,
    pub overlay: Option<Overlay>,
    pub annotation: AnnotationLayer,
    next_id: u64,
    overlay_attachments: usize,
}

/// Path data handed to [`Scene::join_series`]; ids are assigned by the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct PathUpdate {
    pub key: String,
    pub color: Color,
    pub points: Vec<Point>,
}

impl Scene {
    pub fn new(layout: Layout, theme: Theme) -> Self {
        Self {
            layout,
            theme,
            spinner: Spinner::Hidden,
            axes: Vec::new(),
            series: IndexMap::new(),
            overlay: None,
            annotation: AnnotationLayer::default(),
            next_id: 0,
            overlay_attachments: 0,
        }
    }

    pub fn set_axes(&mut self, axes: Vec<Axis>) {
        self.axes = axes;
    }

    /// Keyed enter/update/exit of the series paths.
    pub fn join_series(&mut self, updates: Vec<PathUpdate>) -> SceneDiff {
        let mut diff = SceneDiff::default();

        let incoming: std::collections::HashSet<&str> = updates.iter().map(|s| s.key.as_str()).collect();
        let exited: Vec<String> = self
            .series
            .keys()
            .filter(|k| !incoming.contains(k.as_str()))
            .cloned()
            .collect();
        for key in &exited {
            self.series.shift_remove(key);
        }
        diff.exited = exited;

        for update in updates {
            match self.series.get_mut(&update.key) {
                Some(path) => {
                    path.color = update.color;
                    path.points = update.points;
                    diff.updated.push(update.key);
                }
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    diff.entered.push(update.key.clone());
                    self.series.insert(
                        update.key.clone(),
                        LinePath { id, key: update.key, color: update.color, points: update.points },
                    );
                }
            }
        }
        diff
    }

    /// Attach the pointer overlay if it is not there yet. Returns whether it was created.
    pub fn attach_overlay(&mut self) -> bool {
        if self.overlay.is_some() {
            return false;
        }
        self.overlay = Some(Overlay {
            rect: Rect::from_ltwh(0.0, 0.0, self.layout.plot_width, self.layout.plot_height),
        });
        self.overlay_attachments += 1;
        true
    }

    /// How many times an overlay was created over the scene's lifetime.
    pub fn overlay_attachments(&self) -> usize {
        self.overlay_attachments
    }

    pub fn path(&self, key: &str) -> Option<&LinePath> {
        self.series.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::TABLEAU10;

    fn update(key: &str, n: usize) -> PathUpdate {
        PathUpdate {
            key: key.into(),
            color: TABLEAU10[0],
            points: (0..n).map(|i| Point::new(i as f64, i as f64)).collect(),
        }
    }

    #[test]
    fn join_updates_in_place_and_reports_the_diff() {
        let mut scene = Scene::new(Layout::default(), Theme::default());
        let first = scene.join_series(vec![update("A", 2), update("B", 2)]);
        assert_eq!(first.entered, ["A", "B"]);
        let a_id = scene.path("A").unwrap().id;

        let second = scene.join_series(vec![update("C", 2), update("A", 3)]);
        assert_eq!(second.entered, ["C"]);
        assert_eq!(second.updated, ["A"]);
        assert_eq!(second.exited, ["B"]);
        assert_eq!(scene.path("A").unwrap().id, a_id);
        assert_eq!(scene.path("A").unwrap().points.len(), 3);
        let order: Vec<&str> = scene.series.keys().map(String::as_str).collect();
        assert_eq!(order, ["A", "C"]);
    }

    #[test]
    fn overlay_is_attached_once() {
        let mut scene = Scene::new(Layout::default(), Theme::default());
        assert!(scene.attach_overlay());
        assert!(!scene.attach_overlay());
        assert_eq!(scene.overlay_attachments(), 1);
        assert_eq!(scene.overlay.unwrap().rect.width, 1100.0);
    }
}

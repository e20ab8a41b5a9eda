// File: crates/chart-core/src/lib.rs
// Summary: Core library entry point; exports the public API for loading, aggregating, scaling and rendering county series.

pub mod annotation;
pub mod axis;
pub mod chart;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod ingest;
pub mod loader;
pub mod scale;
pub mod scene;
pub mod series;
pub mod svg;
pub mod text;
pub mod theme;
pub mod types;

pub use annotation::{AnnotationEngine, LegendEntry, PointerEvent, Visibility};
pub use axis::Axis;
pub use chart::{Chart, ChartState, LoadOutcome};
pub use config::ChartConfig;
pub use error::{ChartError, ChartResult};
pub use ingest::{Payload, RawRecord};
pub use loader::{Alert, AlertSink, DataSource, FileSource, HttpSource, LoadState, LoadTicket, StaticSource};
pub use scale::{build_scales, ScaleMapping, ScaleMode, TimeScale, ValueScale};
pub use scene::{Scene, SceneDiff, Spinner};
pub use series::{aggregate, DataPoint, Series, SeriesFilter};
pub use text::TextMeasure;
pub use theme::{Color, ColorScale, Theme};
pub use types::{Layout, Viewport};

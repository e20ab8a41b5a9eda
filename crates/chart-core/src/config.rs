// File: crates/chart-core/src/config.rs
// Summary: Chart configuration with defaults, layered from an optional TOML file and COUNTY_CHART_* env vars.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ChartResult;
use crate::ingest::parse_date;
use crate::loader::{hospitalization_query_url, HOSPITALIZATION_RESOURCE, OPEN_DATA_ENDPOINT};
use crate::scale::ScaleMode;
use crate::series::{default_cutoff, SeriesFilter, DEFAULT_COUNTIES};
use crate::theme::{self, Theme};
use crate::types::{Layout, HEIGHT, WIDTH};

/// Environment prefix, e.g. `COUNTY_CHART_SCALE=lin`.
pub const ENV_PREFIX: &str = "COUNTY_CHART";
/// Config file looked up in the working directory when none is given.
pub const DEFAULT_FILE: &str = "county-chart";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    /// Payload URL. Empty means the open-data SQL query.
    pub source_url: String,
    /// Selector value, `lin` or `log`.
    pub scale: String,
    pub counties: Vec<String>,
    /// First date kept, in any accepted record date form.
    pub cutoff: String,
    pub theme: String,
    pub timeout_secs: u64,
    pub width: f64,
    pub height: f64,
    pub margin: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            source_url: String::new(),
            scale: ScaleMode::default().as_selector().to_string(),
            counties: DEFAULT_COUNTIES.iter().map(|c| c.to_string()).collect(),
            cutoff: "2020-04-01".to_string(),
            theme: "light".to_string(),
            timeout_secs: 30,
            width: WIDTH,
            height: HEIGHT,
            margin: 50,
        }
    }
}

impl ChartConfig {
    /// Defaults, then the config file (`path`, or `county-chart.{toml,..}` if present), then env.
    pub fn load(path: Option<&Path>) -> ChartResult<Self> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(p) => builder.add_source(config::File::from(p)),
            None => builder.add_source(config::File::with_name(DEFAULT_FILE).required(false)),
        };
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("counties"),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn scale_mode(&self) -> ScaleMode {
        ScaleMode::from_selector(Some(&self.scale))
    }

    pub fn filter(&self) -> SeriesFilter {
        SeriesFilter {
            keys: self.counties.clone(),
            cutoff: parse_date(&self.cutoff).unwrap_or_else(default_cutoff),
        }
    }

    pub fn layout(&self) -> Layout {
        Layout::from_surface(self.width, self.height, self.margin)
    }

    pub fn theme(&self) -> Theme {
        theme::find(&self.theme)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn source_url(&self) -> String {
        if self.source_url.trim().is_empty() {
            hospitalization_query_url(OPEN_DATA_ENDPOINT, HOSPITALIZATION_RESOURCE)
        } else {
            self.source_url.clone()
        }
    }
}

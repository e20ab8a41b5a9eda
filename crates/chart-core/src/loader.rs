// File: crates/chart-core/src/loader.rs
// Summary: Data sources (HTTP, file, in-memory) and the load orchestrator with latest-wins generations.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ChartError, ChartResult};
use crate::ingest::Payload;
use crate::scene::Spinner;

/// CKAN SQL endpoint of the California open data portal.
pub const OPEN_DATA_ENDPOINT: &str = "https://data.ca.gov/api/3/action/datastore_search_sql";
/// Resource id of the county hospitalization table.
pub const HOSPITALIZATION_RESOURCE: &str = "42d33765-20fd-44b8-a978-b083b7542225";

/// URL querying the four columns the chart needs, ordered by date.
pub fn hospitalization_query_url(endpoint: &str, resource: &str) -> String {
    let sql = format!(
        "SELECT todays_date, county, hospitalized_covid_patients, \
         hospitalized_suspected_covid_patients FROM \"{resource}\" \
         WHERE todays_date IS NOT NULL ORDER BY todays_date"
    );
    format!("{}?sql={}", endpoint.trim_end_matches('/'), urlencoding::encode(&sql))
}

/// Anything that can produce a payload asynchronously.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> ChartResult<Payload>;

    /// Short human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// GET a JSON payload over HTTP.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ChartResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChartError::fetch_with("failed to build HTTP client", e))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self) -> ChartResult<Payload> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ChartError::fetch_with(format!("request to {} failed", self.url), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::fetch(format!("{} answered with status {}", self.url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ChartError::fetch_with("failed to read response body", e))?;
        Payload::from_slice(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Read a saved JSON payload from disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self) -> ChartResult<Payload> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ChartError::fetch_with(format!("reading {}", self.path.display()), e))?;
        Payload::from_slice(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serve a fixed payload (or a fixed failure message).
#[derive(Clone, Debug)]
pub struct StaticSource {
    outcome: Result<Payload, String>,
}

impl StaticSource {
    pub fn new(payload: Payload) -> Self {
        Self { outcome: Ok(payload) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()) }
    }
}

#[async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> ChartResult<Payload> {
        self.outcome.clone().map_err(ChartError::fetch)
    }

    fn describe(&self) -> String {
        "static payload".to_string()
    }
}

/// User-visible failure notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub detail: String,
}

impl Alert {
    pub fn from_error(err: &ChartError) -> Self {
        Self { message: err.to_string(), detail: err.detail() }
    }
}

/// Where alerts go. A UI host shows a blocking dialog; the default logs.
pub trait AlertSink {
    fn alert(&mut self, alert: &Alert);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&mut self, alert: &Alert) {
        tracing::error!(detail = %alert.detail, "{}", alert.message);
    }
}

/// Stamp handed out by [`LoadOrchestrator::begin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { generation: u64 },
    Loaded { generation: u64 },
    Failed { generation: u64, alert: Alert },
}

/// Tracks in-flight loads. Only the most recently issued ticket may commit.
#[derive(Clone, Debug)]
pub struct LoadOrchestrator {
    issued: u64,
    state: LoadState,
}

impl Default for LoadOrchestrator {
    fn default() -> Self {
        Self { issued: 0, state: LoadState::Idle }
    }
}

impl LoadOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn latest(&self) -> u64 {
        self.issued
    }

    /// Start a load: any previous indicator is replaced by a fresh spinner.
    pub fn begin(&mut self) -> LoadTicket {
        self.issued += 1;
        self.state = LoadState::Loading { generation: self.issued };
        tracing::info!(generation = self.issued, "load started");
        LoadTicket { generation: self.issued }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.issued
    }

    pub fn succeed(&mut self, ticket: LoadTicket) {
        self.state = LoadState::Loaded { generation: ticket.generation };
    }

    pub fn fail(&mut self, ticket: LoadTicket, alert: Alert) {
        self.state = LoadState::Failed { generation: ticket.generation, alert };
    }

    pub fn spinner(&self) -> Spinner {
        match self.state {
            LoadState::Idle | LoadState::Loaded { .. } => Spinner::Hidden,
            LoadState::Loading { .. } => Spinner::Spinning,
            LoadState::Failed { .. } => Spinner::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_is_encoded() {
        let url = hospitalization_query_url(OPEN_DATA_ENDPOINT, HOSPITALIZATION_RESOURCE);
        assert!(url.starts_with("https://data.ca.gov/api/3/action/datastore_search_sql?sql=SELECT%20todays_date"));
        assert!(url.contains("%2242d33765-20fd-44b8-a978-b083b7542225%22"));
        assert!(url.ends_with("ORDER%20BY%20todays_date"));
    }

    #[test]
    fn only_the_latest_ticket_is_current() {
        let mut o = LoadOrchestrator::new();
        let a = o.begin();
        let b = o.begin();
        assert!(!o.is_current(a));
        assert!(o.is_current(b));
        assert_eq!(o.spinner(), Spinner::Spinning);
    }

    #[test]
    fn spinner_follows_state() {
        let mut o = LoadOrchestrator::new();
        assert_eq!(o.spinner(), Spinner::Hidden);
        let t = o.begin();
        o.fail(t, Alert { message: "m".into(), detail: "d".into() });
        assert_eq!(o.spinner(), Spinner::Failed);
        let t = o.begin();
        assert_eq!(o.spinner(), Spinner::Spinning);
        o.succeed(t);
        assert_eq!(o.spinner(), Spinner::Hidden);
    }

    #[tokio::test]
    async fn static_source_failure_is_a_fetch_error() {
        let err = StaticSource::failing("offline").fetch().await.unwrap_err();
        assert!(matches!(err, ChartError::Fetch { .. }));
        assert_eq!(err.to_string(), "fetch failed: offline");
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let err = FileSource::new("/definitely/not/here.json").fetch().await.unwrap_err();
        assert!(err.detail().contains("caused by"));
    }
}

// File: crates/chart-core/src/error.rs
// Summary: Error kinds surfaced by ingest, fetch, rendering and configuration.

use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Transport, HTTP status, file or decode failure while fetching the payload.
    #[error("fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The payload arrived but reports `success: false`.
    #[error("ingest failed: source reported an unsuccessful query")]
    Ingest,

    #[error("render failed: {0}")]
    Render(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl ChartError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch { message: message.into(), source: None }
    }

    pub fn fetch_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Diagnostic trace: the error followed by its `source()` chain, one cause per line.
    pub fn detail(&self) -> String {
        let mut out = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            cause = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_walks_the_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ChartError::fetch_with("reading fixture", io);
        let detail = err.detail();
        assert!(detail.starts_with("fetch failed: reading fixture"));
        assert!(detail.contains("caused by: no such file"));
    }

    #[test]
    fn ingest_detail_is_just_the_message() {
        assert_eq!(ChartError::Ingest.detail(), ChartError::Ingest.to_string());
    }
}

//! Error types shared across the pipeline.
//!
//! Only [`ConfigError`] and [`ReportError`] are fatal. [`FetchError`] and
//! [`SourceUnavailable`] stay inside the adapter boundary: the orchestrator
//! logs them and carries on with whatever the other sources produced.

use std::path::PathBuf;
use thiserror::Error;

/// A failed HTTP request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Decode(_) => false,
        }
    }
}

/// A source adapter could not produce mentions for one query.
#[derive(Debug, Error)]
#[error("source {source_name} unavailable: {reason}")]
pub struct SourceUnavailable {
    pub source_name: String,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transience() {
        let rate_limited = FetchError::Status {
            status: 429,
            url: "https://example.com".to_string(),
        };
        let missing = FetchError::Status {
            status: 404,
            url: "https://example.com".to_string(),
        };
        let upstream = FetchError::Status {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert!(rate_limited.is_transient());
        assert!(upstream.is_transient());
        assert!(!missing.is_transient());
        assert!(!FetchError::Decode("bad".to_string()).is_transient());
    }

    #[test]
    fn test_source_unavailable_message() {
        let err = SourceUnavailable::new("Indeed", "unexpected status 403");
        assert_eq!(err.to_string(), "source Indeed unavailable: unexpected status 403");
    }
}

//! Tracker client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("SOAP fault ({code}): {message}")]
    Fault { code: String, message: String },

    #[error("unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Request(err.to_string())
    }
}

impl From<TrackerError> for issuesync_core::Error {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Request(_) | TrackerError::Unreachable(_) => {
                issuesync_core::Error::Connectivity(err.to_string())
            }
            TrackerError::Fault { .. } | TrackerError::Http { .. } | TrackerError::Parse(_) => {
                issuesync_core::Error::RemoteProtocol(err.to_string())
            }
        }
    }
}

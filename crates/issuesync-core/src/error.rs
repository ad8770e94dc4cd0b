//! Error types for issuesync.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid pattern, missing URL or other bad settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The tracker could not be reached.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// The tracker rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Malformed responses or faults raised by the tracker.
    #[error("remote protocol error: {0}")]
    RemoteProtocol(String),
}

impl Error {
    /// Whether this error comes from configuration rather than the tracker.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

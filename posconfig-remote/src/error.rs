//! Remote client error types.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the configuration service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport failure, including client-side timeouts.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("remote rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("invalid remote configuration: {0}")]
    Config(String),
}

impl RemoteError {
    /// HTTP status of a rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

//! Engine error types.

use posconfig_cache::CacheError;
use posconfig_remote::RemoteError;
use thiserror::Error;

/// Result type for store and context operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("no async runtime available: {0}")]
    Runtime(String),
}

impl StoreError {
    /// Transport failure talking to the configuration service.
    pub fn is_network(&self) -> bool {
        matches!(self, StoreError::Remote(RemoteError::Network(_)))
    }

    /// The configuration service answered with a non-2xx status.
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Remote(RemoteError::Rejected { .. }))
    }
}

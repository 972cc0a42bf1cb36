//! Cache error types.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// No durable storage on this host; callers fall back to memory-only.
    #[error("durable storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("cache write failed: {0}")]
    StorageWrite(String),

    #[error("cache record is corrupt: {0}")]
    Corrupt(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

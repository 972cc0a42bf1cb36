//! Durable settings cache for the POS configuration engine.
//!
//! One SQLite database per connection identity, holding a single `ajustes`
//! table. The whole configuration tree is stored as one JSON blob under a
//! fixed slot and is only ever replaced whole.

mod error;
mod local;
mod record;

pub use error::{CacheError, CacheResult};
pub use local::LocalCache;
pub use record::{CACHE_SCHEMA_VERSION, CacheRecord, OBJECT_STORE, SETTINGS_SLOT};

/// Storage seam used by the configuration store.
///
/// Implementations must make a completed `write` visible to every later
/// `read` on the same handle.
pub trait CacheStore: Send + Sync {
    /// Returns the last record written to `slot`, or `None` if there is none.
    fn read(&self, slot: &str) -> CacheResult<Option<CacheRecord>>;

    /// Replaces the record in `slot`.
    fn write(&self, slot: &str, record: &CacheRecord) -> CacheResult<()>;
}

//! SQLite-backed cache partition.

use crate::error::{CacheError, CacheResult};
use crate::record::{CacheRecord, OBJECT_STORE};
use crate::CacheStore;
use posconfig_types::{ConfigurationTree, ConnectionIdentity};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Durable cache partition for one connection identity.
///
/// Each identity gets its own database file (`<partition>.db`) under the
/// cache directory, so trees of different tenants never share storage.
#[derive(Clone)]
pub struct LocalCache {
    conn: Arc<Mutex<Connection>>,
    identity: ConnectionIdentity,
    path: Option<PathBuf>,
}

impl LocalCache {
    /// Opens (or creates) the partition for `identity` under `dir`.
    ///
    /// Idempotent. Any failure to reach durable storage is reported as
    /// [`CacheError::StorageUnavailable`].
    pub fn open(dir: &Path, identity: &ConnectionIdentity) -> CacheResult<Self> {
        std::fs::create_dir_all(dir).map_err(|e| {
            CacheError::StorageUnavailable(format!("create {}: {e}", dir.display()))
        })?;
        let path = dir.join(format!("{}.db", identity.partition_name()));
        let conn = Connection::open(&path).map_err(|e| {
            CacheError::StorageUnavailable(format!("open {}: {e}", path.display()))
        })?;
        initialize_schema(&conn)
            .map_err(|e| CacheError::StorageUnavailable(format!("init schema: {e}")))?;
        debug!("opened settings cache for {identity} at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            identity: identity.clone(),
            path: Some(path),
        })
    }

    /// Opens a non-durable partition (for testing).
    pub fn open_in_memory(identity: &ConnectionIdentity) -> CacheResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::StorageUnavailable(e.to_string()))?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            identity: identity.clone(),
            path: None,
        })
    }

    pub fn identity(&self) -> &ConnectionIdentity {
        &self.identity
    }

    /// Database file backing this partition; `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Removes the record in `slot`, if any.
    pub fn clear(&self, slot: &str) -> CacheResult<()> {
        let conn = self.lock();
        conn.execute(
            &format!("DELETE FROM {OBJECT_STORE} WHERE slot = ?1"),
            params![slot],
        )
        .map_err(|e| CacheError::StorageWrite(e.to_string()))?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheStore for LocalCache {
    fn read(&self, slot: &str) -> CacheResult<Option<CacheRecord>> {
        let conn = self.lock();
        let row: Option<(u32, String)> = conn
            .query_row(
                &format!("SELECT version, data FROM {OBJECT_STORE} WHERE slot = ?1"),
                params![slot],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((version, data)) = row else {
            return Ok(None);
        };

        let tree: ConfigurationTree = serde_json::from_str(&data)
            .map_err(|e| CacheError::Corrupt(format!("slot {slot}: {e}")))?;
        let record = CacheRecord { version, tree };
        if !record.is_current() {
            warn!(
                "ignoring cached {slot} for {} with schema version {version}",
                self.identity
            );
            return Ok(None);
        }
        Ok(Some(record))
    }

    fn write(&self, slot: &str, record: &CacheRecord) -> CacheResult<()> {
        let data = serde_json::to_string(&record.tree)?;
        let conn = self.lock();
        conn.execute(
            &format!(
                "INSERT INTO {OBJECT_STORE} (slot, version, data, updated_at)
                 VALUES (?1, ?2, ?3, strftime('%s', 'now'))
                 ON CONFLICT(slot) DO UPDATE SET
                     version = excluded.version,
                     data = excluded.data,
                     updated_at = excluded.updated_at"
            ),
            params![slot, record.version, data],
        )
        .map_err(|e| CacheError::StorageWrite(e.to_string()))?;
        Ok(())
    }
}

fn initialize_schema(conn: &Connection) -> CacheResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = WAL;

        CREATE TABLE IF NOT EXISTS {OBJECT_STORE} (
            slot TEXT PRIMARY KEY,
            version INTEGER NOT NULL,
            data TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "
    ))?;
    Ok(())
}

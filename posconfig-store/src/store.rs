//! The authoritative in-memory configuration tree for one connection.
//!
//! Writes are confirm-then-commit: a value reaches the tree only after the
//! remote service has accepted it, and every commit is followed by a
//! whole-tree cache write. Reads never touch I/O.

use crate::error::{StoreError, StoreResult};
use chrono::Utc;
use posconfig_cache::{CacheRecord, CacheStore, SETTINGS_SLOT};
use posconfig_remote::RemoteConfigService;
use posconfig_types::{ConfigurationTree, ConnectionIdentity, ContextDescriptor, Scope, keys};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Lifecycle of a [`ConfigStore`].
///
/// Only moves forward: `Uninitialized` to `Loading` on the first download,
/// then `Ready` for good. Later downloads leave the state at `Ready`. A
/// failed download still ends in `Ready`; failures are reported through
/// [`ConfigStore::last_error`], not through the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

/// Per-key write ordering.
///
/// `issued` counts writes handed to the remote; `committed` is the ticket of
/// the newest write applied to the tree. A confirmed write whose ticket is
/// not newer than `committed` has been overtaken and is dropped.
#[derive(Default)]
struct KeyTickets {
    issued: u64,
    committed: u64,
}

/// Configuration store bound to one connection identity.
pub struct ConfigStore {
    identity: ConnectionIdentity,
    remote: Option<Arc<dyn RemoteConfigService>>,
    cache: Option<Arc<dyn CacheStore>>,
    tree: RwLock<ConfigurationTree>,
    state: Mutex<StoreState>,
    last_error: Mutex<Option<String>>,
    tickets: Mutex<HashMap<String, KeyTickets>>,
    /// Sequences tree commits with their cache writes so the last record
    /// written always equals the tree at that point.
    persist: Mutex<()>,
}

impl ConfigStore {
    /// Creates an empty store.
    ///
    /// Without a remote service the store runs degraded: `download` and
    /// `set` resolve immediately and never change the tree. Without a
    /// cache the store is memory-only.
    pub fn new(
        identity: ConnectionIdentity,
        remote: Option<Arc<dyn RemoteConfigService>>,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self {
            identity,
            remote,
            cache,
            tree: RwLock::new(ConfigurationTree::new()),
            state: Mutex::new(StoreState::Uninitialized),
            last_error: Mutex::new(None),
            tickets: Mutex::new(HashMap::new()),
            persist: Mutex::new(()),
        }
    }

    pub fn identity(&self) -> &ConnectionIdentity {
        &self.identity
    }

    pub fn state(&self) -> StoreState {
        *lock(&self.state)
    }

    /// True when no remote service is available on this host.
    pub fn is_degraded(&self) -> bool {
        self.remote.is_none()
    }

    /// True when there is no durable cache behind this store.
    pub fn is_memory_only(&self) -> bool {
        self.cache.is_none()
    }

    /// Message of the most recent failed download or set, cleared by the
    /// next success.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    // ── Reads ──

    /// Current value at `key`. Never blocks on I/O.
    pub fn get(&self, key: &str) -> Option<Value> {
        read(&self.tree).get(key).cloned()
    }

    /// Current value at `key` deserialized into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        read(&self.tree).get_as(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        read(&self.tree).contains_key(key)
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> ConfigurationTree {
        read(&self.tree).clone()
    }

    // ── Cache ──

    /// Seeds the tree from the durable cache.
    ///
    /// Only an `Uninitialized` store is seeded; once a download has started
    /// the tree is newer than anything the cache can hold. Returns whether
    /// a record was loaded. Read failures are logged and treated as an
    /// empty cache.
    pub fn load_cache(&self) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let _persist = lock(&self.persist);
        if self.state() != StoreState::Uninitialized {
            debug!("{} already loading, not reseeding from cache", self.identity);
            return false;
        }
        match cache.read(SETTINGS_SLOT) {
            Ok(Some(record)) => {
                debug!(
                    "loaded {} cached setting(s) for {}",
                    record.tree.len(),
                    self.identity
                );
                *write(&self.tree) = record.tree;
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("settings cache read failed for {}: {e}", self.identity);
                false
            }
        }
    }

    /// Writes `tree` to the cache. Caller must hold the persist lock.
    fn persist_locked(&self, tree: ConfigurationTree) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.write(SETTINGS_SLOT, &CacheRecord::new(tree)) {
            warn!("settings cache write failed for {}: {e}", self.identity);
        }
    }

    // ── Remote ──

    /// Replaces the whole tree with the remote copy.
    ///
    /// A fetched tree without a `deviceID` is stamped with a provisional
    /// `tmp-<unix millis>` identifier before it is committed. On failure
    /// the tree is left as it was and the error is returned.
    pub async fn download(&self, current_user: Option<&str>) -> StoreResult<ConfigurationTree> {
        let Some(remote) = &self.remote else {
            debug!("no remote service for {}, skipping download", self.identity);
            self.set_state(StoreState::Ready);
            return Ok(self.snapshot());
        };

        self.begin_loading();
        let context = ContextDescriptor::from_tree(&read(&self.tree), current_user);
        let result = remote.fetch_all(&self.identity, &context).await;
        self.set_state(StoreState::Ready);

        let mut fetched = match result {
            Ok(tree) => tree,
            Err(e) => {
                let err = StoreError::from(e);
                warn!("settings download failed for {}: {err}", self.identity);
                self.record_error(&err);
                return Err(err);
            }
        };

        if !fetched.contains_key(keys::DEVICE_ID) {
            let device_id = provisional_device_id();
            info!("provisioning {} with device id {device_id}", self.identity);
            fetched.insert(keys::DEVICE_ID, Value::String(device_id));
        }

        {
            let _persist = lock(&self.persist);
            *write(&self.tree) = fetched.clone();
            self.persist_locked(fetched.clone());
        }
        self.clear_error();
        info!("downloaded {} setting(s) for {}", fetched.len(), self.identity);
        Ok(fetched)
    }

    /// Writes one key remotely, then commits it locally.
    ///
    /// Nothing changes locally unless the remote accepts the write; a
    /// rejected or failed write returns the error and leaves the previous
    /// value in place.
    pub async fn set(
        &self,
        key: &str,
        value: Value,
        scope: Option<Scope>,
        current_user: Option<&str>,
    ) -> StoreResult<()> {
        let mut partial = ConfigurationTree::new();
        partial.insert(key, value);
        self.set_many(partial, scope, current_user).await
    }

    /// Writes several keys in one remote request and commits them together.
    pub async fn set_many(
        &self,
        partial: ConfigurationTree,
        scope: Option<Scope>,
        current_user: Option<&str>,
    ) -> StoreResult<()> {
        if partial.is_empty() {
            return Ok(());
        }
        let Some(remote) = &self.remote else {
            debug!("no remote service for {}, ignoring write", self.identity);
            return Ok(());
        };

        let tickets = self.issue_tickets(&partial);
        let context = ContextDescriptor::from_tree(&read(&self.tree), current_user);

        if let Err(e) = remote
            .set_keys(&self.identity, &context, &partial, scope)
            .await
        {
            let err = StoreError::from(e);
            warn!("settings write failed for {}: {err}", self.identity);
            self.record_error(&err);
            return Err(err);
        }

        self.commit(partial, &tickets);
        self.clear_error();
        Ok(())
    }

    fn issue_tickets(&self, partial: &ConfigurationTree) -> HashMap<String, u64> {
        let mut tickets = lock(&self.tickets);
        partial
            .keys()
            .map(|key| {
                let entry = tickets.entry(key.clone()).or_default();
                entry.issued += 1;
                (key.clone(), entry.issued)
            })
            .collect()
    }

    fn commit(&self, partial: ConfigurationTree, issued: &HashMap<String, u64>) {
        let _persist = lock(&self.persist);
        let snapshot = {
            let mut tickets = lock(&self.tickets);
            let mut tree = write(&self.tree);
            let mut applied = 0usize;
            for (key, value) in partial {
                let ticket = issued.get(&key).copied().unwrap_or_default();
                let entry = tickets.entry(key.clone()).or_default();
                if ticket <= entry.committed {
                    debug!("dropping overtaken write of {key} for {}", self.identity);
                    continue;
                }
                entry.committed = ticket;
                tree.insert(key, value);
                applied += 1;
            }
            if applied == 0 {
                return;
            }
            (*tree).clone()
        };
        self.persist_locked(snapshot);
    }

    fn set_state(&self, state: StoreState) {
        *lock(&self.state) = state;
    }

    fn begin_loading(&self) {
        let mut state = lock(&self.state);
        if *state == StoreState::Uninitialized {
            *state = StoreState::Loading;
        }
    }

    fn record_error(&self, err: &StoreError) {
        *lock(&self.last_error) = Some(err.to_string());
    }

    fn clear_error(&self) {
        *lock(&self.last_error) = None;
    }
}

fn provisional_device_id() -> String {
    format!(
        "{}{}",
        keys::TEMP_DEVICE_ID_PREFIX,
        Utc::now().timestamp_millis()
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

//! Session-scoped access to a configuration store.

use crate::config::EngineConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::ConfigStore;
use posconfig_cache::{CacheStore, LocalCache};
use posconfig_remote::{RemoteConfigClient, RemoteConfigService};
use posconfig_types::{ConfigurationTree, ConnectionIdentity, Scope};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// One configuration store for the lifetime of a UI session.
///
/// Construction seeds the store from the cache and starts the initial
/// download in the background. [`AccessContext::is_loading`] stays true
/// until that download settles, whether it succeeded or not.
pub struct AccessContext {
    store: Arc<ConfigStore>,
    current_user: Option<String>,
    runtime: Handle,
    loading_tx: Arc<watch::Sender<bool>>,
    loading_rx: watch::Receiver<bool>,
    last_error: Arc<Mutex<Option<Arc<StoreError>>>>,
}

impl AccessContext {
    /// Creates the store and kicks off its initial download.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(
        identity: ConnectionIdentity,
        remote: Option<Arc<dyn RemoteConfigService>>,
        cache: Option<Arc<dyn CacheStore>>,
        current_user: Option<String>,
    ) -> StoreResult<Self> {
        let runtime = Handle::try_current().map_err(|e| StoreError::Runtime(e.to_string()))?;

        let store = Arc::new(ConfigStore::new(identity, remote, cache));
        if store.load_cache() {
            debug!("serving cached settings for {} while downloading", store.identity());
        }

        let (loading_tx, loading_rx) = watch::channel(false);
        let context = Self {
            store,
            current_user,
            runtime,
            loading_tx: Arc::new(loading_tx),
            loading_rx,
            last_error: Arc::new(Mutex::new(None)),
        };
        context.spawn_download();
        Ok(context)
    }

    /// Wires the SQLite cache and HTTP client described by `config`.
    ///
    /// An unusable cache directory degrades to memory-only; an offline
    /// config runs without a remote service.
    pub fn from_config(config: &EngineConfig, identity: ConnectionIdentity) -> StoreResult<Self> {
        let cache: Option<Arc<dyn CacheStore>> = match &config.cache_dir {
            Some(dir) => match LocalCache::open(dir, &identity) {
                Ok(cache) => Some(Arc::new(cache)),
                Err(e) => {
                    warn!("running {identity} memory-only: {e}");
                    None
                }
            },
            None => None,
        };

        let remote: Option<Arc<dyn RemoteConfigService>> = if config.offline {
            info!("offline host, settings for {identity} will not sync");
            None
        } else {
            Some(Arc::new(RemoteConfigClient::new(config.remote.clone())?))
        };

        Self::open(identity, remote, cache, config.current_user.clone())
    }

    /// Flips `loading` on and spawns a download; false if one is running.
    fn spawn_download(&self) -> bool {
        let started = self.loading_tx.send_if_modified(|loading| {
            if *loading {
                return false;
            }
            *loading = true;
            true
        });
        if !started {
            return false;
        }

        let store = Arc::clone(&self.store);
        let user = self.current_user.clone();
        let loading_tx = Arc::clone(&self.loading_tx);
        let last_error = Arc::clone(&self.last_error);

        self.runtime.spawn(async move {
            let outcome = store.download(user.as_deref()).await;
            *lock(&last_error) = outcome.err().map(Arc::new);
            loading_tx.send_replace(false);
        });
        true
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    pub fn identity(&self) -> &ConnectionIdentity {
        self.store.identity()
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_rx.borrow()
    }

    /// Error of the last download, kept after loading has finished.
    pub fn last_error(&self) -> Option<Arc<StoreError>> {
        lock(&self.last_error).clone()
    }

    /// Resolves once the in-flight download has settled.
    pub async fn wait_loaded(&self) {
        let mut rx = self.loading_rx.clone();
        // A closed channel means the download task is gone; nothing to wait for.
        let _ = rx.wait_for(|loading| !*loading).await;
    }

    /// Starts another background download unless one is already running.
    pub fn reload(&self) {
        if !self.spawn_download() {
            debug!("download already in flight for {}", self.identity());
        }
    }

    // ── Consumer interface ──

    pub fn get(&self, key: &str) -> Option<Value> {
        self.store.get(key)
    }

    pub fn snapshot(&self) -> ConfigurationTree {
        self.store.snapshot()
    }

    /// Writes through the store on behalf of this session's user.
    pub async fn set(&self, key: &str, value: Value, scope: Option<Scope>) -> StoreResult<()> {
        self.store
            .set(key, value, scope, self.current_user.as_deref())
            .await
    }

    pub async fn set_many(
        &self,
        partial: ConfigurationTree,
        scope: Option<Scope>,
    ) -> StoreResult<()> {
        self.store
            .set_many(partial, scope, self.current_user.as_deref())
            .await
    }
}

/// Session-wide map of connection identity to access context.
///
/// Opening an identity that is already open returns the existing context,
/// so one session never runs two initial downloads for the same identity.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ConnectionIdentity, Arc<AccessContext>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context for `identity`, building it with `open` the first
    /// time. `open` runs at most once per identity while it stays registered.
    pub fn get_or_open<F>(&self, identity: &ConnectionIdentity, open: F) -> StoreResult<Arc<AccessContext>>
    where
        F: FnOnce() -> StoreResult<AccessContext>,
    {
        let mut sessions = lock(&self.sessions);
        if let Some(existing) = sessions.get(identity) {
            return Ok(Arc::clone(existing));
        }
        let context = Arc::new(open()?);
        sessions.insert(identity.clone(), Arc::clone(&context));
        Ok(context)
    }

    /// [`SessionRegistry::get_or_open`] using [`AccessContext::from_config`].
    pub fn open_with_config(
        &self,
        config: &EngineConfig,
        identity: &ConnectionIdentity,
    ) -> StoreResult<Arc<AccessContext>> {
        self.get_or_open(identity, || {
            AccessContext::from_config(config, identity.clone())
        })
    }

    pub fn get(&self, identity: &ConnectionIdentity) -> Option<Arc<AccessContext>> {
        lock(&self.sessions).get(identity).cloned()
    }

    /// Forgets the context for `identity`. Holders of the `Arc` keep a
    /// working store; the next open builds a fresh one.
    pub fn close(&self, identity: &ConnectionIdentity) -> Option<Arc<AccessContext>> {
        lock(&self.sessions).remove(identity)
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sessions).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

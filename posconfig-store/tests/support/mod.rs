//! Shared test doubles for the store and context tests.
#![allow(dead_code)]

use async_trait::async_trait;
use posconfig_cache::{CacheError, CacheRecord, CacheResult, CacheStore, LocalCache};
use posconfig_remote::{RemoteConfigService, RemoteError, RemoteResult};
use posconfig_store::ConfigStore;
use posconfig_types::{ConfigurationTree, ConnectionIdentity, ContextDescriptor, Scope};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn acme() -> ConnectionIdentity {
    ConnectionIdentity::new("Acme").unwrap()
}

pub fn tree(value: Value) -> ConfigurationTree {
    ConfigurationTree::try_from(value).unwrap()
}

pub fn rejected(status: u16) -> RemoteError {
    RemoteError::Rejected {
        status,
        body: "simulated".into(),
    }
}

/// One recorded `set_keys` call.
#[derive(Clone, Debug)]
pub struct SetCall {
    pub data: ConfigurationTree,
    pub scope: Option<Scope>,
    pub context: ContextDescriptor,
}

/// Remote double with scripted replies and per-value gates.
///
/// A gated `set_keys` call is recorded first and only answers after the
/// gate is opened, which lets tests choose completion order.
#[derive(Default)]
pub struct ScriptedRemote {
    fetch_tree: Mutex<Option<ConfigurationTree>>,
    fetch_status: Mutex<Option<u16>>,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
    fetch_calls: AtomicUsize,
    rejected_values: Mutex<Vec<Value>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    set_calls: Mutex<Vec<SetCall>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serving(tree: ConfigurationTree) -> Arc<Self> {
        let remote = Self::default();
        *remote.fetch_tree.lock().unwrap() = Some(tree);
        Arc::new(remote)
    }

    pub fn fail_fetch_with(&self, status: u16) {
        *self.fetch_status.lock().unwrap() = Some(status);
    }

    pub fn serve(&self, tree: ConfigurationTree) {
        *self.fetch_status.lock().unwrap() = None;
        *self.fetch_tree.lock().unwrap() = Some(tree);
    }

    /// Holds fetch-all until the returned gate is notified.
    pub fn gate_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.fetch_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Rejects any write carrying `value` with a 500.
    pub fn reject_value(&self, value: Value) {
        self.rejected_values.lock().unwrap().push(value);
    }

    /// Holds any write carrying `value` until the returned gate is notified.
    pub fn gate_value(&self, value: &Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(value.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> Vec<SetCall> {
        self.set_calls.lock().unwrap().clone()
    }

    pub fn set_call_count(&self) -> usize {
        self.set_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteConfigService for ScriptedRemote {
    async fn fetch_all(
        &self,
        _identity: &ConnectionIdentity,
        _context: &ContextDescriptor,
    ) -> RemoteResult<ConfigurationTree> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.fetch_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(status) = *self.fetch_status.lock().unwrap() {
            return Err(rejected(status));
        }
        Ok(self.fetch_tree.lock().unwrap().clone().unwrap_or_default())
    }

    async fn set_keys(
        &self,
        _identity: &ConnectionIdentity,
        context: &ContextDescriptor,
        data: &ConfigurationTree,
        scope: Option<Scope>,
    ) -> RemoteResult<()> {
        self.set_calls.lock().unwrap().push(SetCall {
            data: data.clone(),
            scope,
            context: context.clone(),
        });

        let gate = data
            .iter()
            .find_map(|(_, v)| self.gates.lock().unwrap().get(&v.to_string()).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reject = {
            let rejected_values = self.rejected_values.lock().unwrap();
            data.iter().any(|(_, v)| rejected_values.contains(v))
        };
        if reject {
            return Err(rejected(500));
        }
        Ok(())
    }
}

/// Cache whose writes always fail.
pub struct FailingCache;

impl CacheStore for FailingCache {
    fn read(&self, _slot: &str) -> CacheResult<Option<CacheRecord>> {
        Ok(None)
    }

    fn write(&self, _slot: &str, _record: &CacheRecord) -> CacheResult<()> {
        Err(CacheError::StorageWrite("quota exceeded".into()))
    }
}

pub fn memory_cache() -> Arc<LocalCache> {
    Arc::new(LocalCache::open_in_memory(&acme()).unwrap())
}

pub fn store_with(remote: &Arc<ScriptedRemote>, cache: &Arc<LocalCache>) -> Arc<ConfigStore> {
    let remote: Arc<dyn RemoteConfigService> = remote.clone();
    let cache: Arc<dyn CacheStore> = cache.clone();
    Arc::new(ConfigStore::new(acme(), Some(remote), Some(cache)))
}

/// Yields until `remote` has seen `n` writes.
pub async fn until_set_calls(remote: &ScriptedRemote, n: usize) {
    while remote.set_call_count() < n {
        tokio::task::yield_now().await;
    }
}

/// Yields until `remote` has received `n` fetch-all calls.
pub async fn until_fetch_calls(remote: &ScriptedRemote, n: usize) {
    while remote.fetch_calls() < n {
        tokio::task::yield_now().await;
    }
}

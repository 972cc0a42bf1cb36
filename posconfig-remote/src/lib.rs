//! Client for the remote configuration service.
//!
//! Two operations only:
//! - fetch-all: download the tenant's whole configuration tree
//! - set: write one or more keys, optionally tagged with a [`Scope`]
//!
//! Neither operation retries or touches local state; retry policy and
//! commit decisions belong to the caller.

pub mod client;
pub mod config;
pub mod error;

pub use client::{FETCH_PATH, RemoteConfigClient, SET_PATH};
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};

use async_trait::async_trait;
use posconfig_types::{ConfigurationTree, ConnectionIdentity, ContextDescriptor, Scope};

/// The remote authoritative store, as seen by the configuration store.
#[async_trait]
pub trait RemoteConfigService: Send + Sync {
    /// Downloads the full tree for `identity`.
    async fn fetch_all(
        &self,
        identity: &ConnectionIdentity,
        context: &ContextDescriptor,
    ) -> RemoteResult<ConfigurationTree>;

    /// Writes `data` remotely. Resolves only once the service has accepted it.
    async fn set_keys(
        &self,
        identity: &ConnectionIdentity,
        context: &ContextDescriptor,
        data: &ConfigurationTree,
        scope: Option<Scope>,
    ) -> RemoteResult<()>;
}

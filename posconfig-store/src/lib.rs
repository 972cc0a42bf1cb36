//! Configuration synchronization engine for the POS settings front-end.
//!
//! - [`ConfigStore`]: the authoritative in-memory tree for one connection,
//!   seeded from the durable cache, replaced by remote downloads, and
//!   mutated only after the remote service confirms a write
//! - [`AccessContext`]: one store per session plus its loading flag
//! - [`SessionRegistry`]: single-flight construction of access contexts
//! - [`EngineConfig`]: remote/cache/offline settings with env overrides

pub mod config;
pub mod context;
pub mod error;
pub mod store;
mod telemetry;

pub use config::{EngineConfig, EnvLookup, ProcessEnv};
pub use context::{AccessContext, SessionRegistry};
pub use error::{StoreError, StoreResult};
pub use store::{ConfigStore, StoreState};
pub use telemetry::init_tracing;

pub use posconfig_cache::{CacheStore, LocalCache};
pub use posconfig_remote::{RemoteConfig, RemoteConfigClient, RemoteConfigService};
pub use posconfig_types::{
    ConfigurationTree, ConnectionIdentity, ContextDescriptor, FieldDescriptor, FieldKind, Scope,
    Value, keys,
};

//! Shared data model for the POS configuration engine.
//!
//! Everything the cache, the remote client, the store and the search index
//! agree on lives here:
//! - [`ConfigurationTree`]: the flat key → JSON value settings map
//! - [`ConnectionIdentity`]: which tenant/backend a tree belongs to
//! - [`Scope`]: blast radius tag passed through on remote writes
//! - [`ContextDescriptor`]: device/session context sent with every request
//! - [`FieldDescriptor`]: static metadata used by the search index

mod context;
mod error;
mod field;
mod identity;
mod scope;
mod tree;

pub mod keys;

pub use context::ContextDescriptor;
pub use error::{TypesError, TypesResult};
pub use field::{FieldDescriptor, FieldKind};
pub use identity::ConnectionIdentity;
pub use scope::Scope;
pub use tree::ConfigurationTree;

/// Re-exported so downstream crates share one JSON value type.
pub use serde_json::Value;

use posconfig_types::ConfigurationTree;
use serde::{Deserialize, Serialize};

/// Schema version stamped on every record. Records with another version
/// are ignored on read.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// The single logical slot holding the serialized tree.
pub const SETTINGS_SLOT: &str = "settings";

/// Name of the table (object store) inside each partition.
pub const OBJECT_STORE: &str = "ajustes";

/// Serialized configuration tree plus its schema version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    pub tree: ConfigurationTree,
}

impl CacheRecord {
    pub fn new(tree: ConfigurationTree) -> Self {
        Self {
            version: CACHE_SCHEMA_VERSION,
            tree,
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == CACHE_SCHEMA_VERSION
    }
}

//! Device/session context sent along with every remote request.

use crate::keys;
use crate::tree::ConfigurationTree;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `tablet` object of fetch/set requests.
///
/// Built from a fixed subset of tree keys plus the caller-supplied current
/// user. Keys missing from the tree are omitted from the JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    #[serde(rename = "deviceID", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Value>,

    #[serde(rename = "warehouseID", default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<Value>,

    #[serde(rename = "serialNumbers", default, skip_serializing_if = "Option::is_none")]
    pub serial_numbers: Option<Value>,

    #[serde(rename = "electronicInvoicing", default, skip_serializing_if = "Option::is_none")]
    pub electronic_invoicing: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ContextDescriptor {
    /// Deterministic and infallible: absent keys stay `None`.
    pub fn from_tree(tree: &ConfigurationTree, current_user: Option<&str>) -> Self {
        Self {
            device_id: tree.get(keys::DEVICE_ID).cloned(),
            warehouse_id: tree.get(keys::WAREHOUSE_ID).cloned(),
            serial_numbers: tree.get(keys::SERIAL_NUMBERS).cloned(),
            electronic_invoicing: tree.get(keys::ELECTRONIC_INVOICING).cloned(),
            user: current_user.map(str::to_string),
        }
    }
}

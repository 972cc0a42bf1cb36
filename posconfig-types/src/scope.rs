use serde::{Deserialize, Serialize};
use std::fmt;

/// How far a remote write reaches.
///
/// Opaque to the engine beyond being forwarded to the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Tenant-wide.
    #[serde(rename = "EMPRESA")]
    Company,
    /// One establishment (store/branch).
    #[serde(rename = "ESTABLECIMIENTO")]
    Establishment,
    /// This device only.
    #[serde(rename = "DISPOSITIVO")]
    Device,
}

impl Scope {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Scope::Company => "EMPRESA",
            Scope::Establishment => "ESTABLECIMIENTO",
            Scope::Device => "DISPOSITIVO",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

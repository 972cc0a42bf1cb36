use crate::error::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names the backend/tenant a configuration tree belongs to.
///
/// Immutable once constructed. Used as the cache partition key and as the
/// seed for the remote base URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionIdentity(String);

impl ConnectionIdentity {
    pub fn new(value: impl Into<String>) -> TypesResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyConnectionIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe name for this identity's cache partition.
    ///
    /// Lowercase ASCII letters and digits pass through; every other byte is
    /// written as `-` plus two lowercase hex digits. The mapping is
    /// injective and the output has no uppercase letters, so distinct
    /// identities never share a file, even on case-insensitive filesystems.
    pub fn partition_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len());
        for byte in self.0.bytes() {
            if byte.is_ascii_lowercase() || byte.is_ascii_digit() {
                name.push(char::from(byte));
            } else {
                name.push('-');
                name.push(hex_digit(byte >> 4));
                name.push(hex_digit(byte & 0x0f));
            }
        }
        name
    }
}

fn hex_digit(nibble: u8) -> char {
    char::from_digit(u32::from(nibble), 16).unwrap_or('0')
}

impl fmt::Display for ConnectionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConnectionIdentity {
    type Error = TypesError;

    fn try_from(value: String) -> TypesResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ConnectionIdentity {
    type Error = TypesError;

    fn try_from(value: &str) -> TypesResult<Self> {
        Self::new(value)
    }
}

impl From<ConnectionIdentity> for String {
    fn from(value: ConnectionIdentity) -> Self {
        value.0
    }
}

//! Engine configuration.

use crate::error::{StoreError, StoreResult};
use posconfig_remote::RemoteConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const ENV_BASE_URL: &str = "POSCONFIG_BASE_URL";
pub const ENV_CACHE_DIR: &str = "POSCONFIG_CACHE_DIR";
pub const ENV_TIMEOUT_SECS: &str = "POSCONFIG_TIMEOUT_SECS";
pub const ENV_OFFLINE: &str = "POSCONFIG_OFFLINE";
pub const ENV_USER: &str = "POSCONFIG_USER";

/// Source of environment variables.
pub trait EnvLookup {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Configuration for the synchronization engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub remote: RemoteConfig,

    /// Directory holding one cache database per connection identity.
    /// `None` runs memory-only.
    pub cache_dir: Option<PathBuf>,

    /// Host without network capability: downloads and writes are no-ops.
    pub offline: bool,

    /// User reported in the context descriptor of every request.
    pub current_user: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            cache_dir: dirs::data_local_dir().map(|d| d.join("posconfig")),
            offline: false,
            current_user: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `POSCONFIG_*` process environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(&ProcessEnv)
    }

    pub fn from_lookup(env: &impl EnvLookup) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(url) = env.var(ENV_BASE_URL) {
            config.remote.base_url = url;
        }
        if let Some(dir) = env.var(ENV_CACHE_DIR) {
            config.cache_dir = if dir.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Some(secs) = env.var(ENV_TIMEOUT_SECS) {
            config.remote.request_timeout_secs = secs.trim().parse().map_err(|e| {
                StoreError::Config(format!("{ENV_TIMEOUT_SECS}={secs:?}: {e}"))
            })?;
        }
        if let Some(flag) = env.var(ENV_OFFLINE) {
            config.offline = parse_flag(&flag)
                .ok_or_else(|| StoreError::Config(format!("{ENV_OFFLINE}={flag:?}: not a boolean")))?;
        }
        if let Some(user) = env.var(ENV_USER) {
            config.current_user = Some(user).filter(|u| !u.trim().is_empty());
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_env_yields_defaults() {
        let config = EngineConfig::from_lookup(&env(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(!config.offline);
    }

    #[test]
    fn overrides_apply() {
        let config = EngineConfig::from_lookup(&env(&[
            (ENV_BASE_URL, "http://10.0.0.5:8080"),
            (ENV_CACHE_DIR, "/var/lib/pos"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_OFFLINE, "yes"),
            (ENV_USER, "cashier-1"),
        ]))
        .unwrap();
        assert_eq!(config.remote.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/lib/pos")));
        assert_eq!(config.remote.request_timeout_secs, 5);
        assert!(config.offline);
        assert_eq!(config.current_user.as_deref(), Some("cashier-1"));
    }

    #[test]
    fn blank_cache_dir_means_memory_only() {
        let config = EngineConfig::from_lookup(&env(&[(ENV_CACHE_DIR, "")])).unwrap();
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let err = EngineConfig::from_lookup(&env(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn bad_offline_flag_is_config_error() {
        let err = EngineConfig::from_lookup(&env(&[(ENV_OFFLINE, "maybe")])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn serialization_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

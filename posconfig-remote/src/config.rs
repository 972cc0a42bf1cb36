//! Remote client configuration.

use crate::error::{RemoteError, RemoteResult};
use posconfig_types::ConnectionIdentity;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Placeholder in [`RemoteConfig::base_url`] replaced by the connection identity.
pub const CONNECTION_PLACEHOLDER: &str = "{connection}";

/// Configuration for the remote configuration client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the configuration service. May contain `{connection}`,
    /// e.g. "https://{connection}.pos.example.com".
    pub base_url: String,

    /// Transport timeout per request in seconds. Expiry surfaces as a
    /// network error.
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://{connection}.pos.local".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("posconfig/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RemoteConfig {
    /// Base URL for `identity`, without a trailing slash.
    ///
    /// The identity is percent-encoded before substitution, so it can never
    /// add path segments or a query. An identity that cannot form a valid
    /// host name (e.g. one with spaces in a `{connection}.host` template) is
    /// a [`RemoteError::Config`].
    pub fn base_url_for(&self, identity: &ConnectionIdentity) -> RemoteResult<String> {
        let encoded = urlencoding::encode(identity.as_str());
        let resolved = self.base_url.replace(CONNECTION_PLACEHOLDER, &encoded);
        let resolved = resolved.trim().trim_end_matches('/').to_string();

        let url = Url::parse(&resolved)
            .map_err(|e| RemoteError::Config(format!("base url {resolved:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RemoteError::Config(format!(
                "base url {resolved:?} must use http or https"
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(RemoteError::Config(format!(
                "base url {resolved:?} must not carry a query or fragment"
            )));
        }
        Ok(resolved)
    }
}

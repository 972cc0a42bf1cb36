//! HTTP implementation of [`RemoteConfigService`].

use crate::config::RemoteConfig;
use crate::error::{RemoteError, RemoteResult};
use crate::RemoteConfigService;
use async_trait::async_trait;
use posconfig_types::{ConfigurationTree, ConnectionIdentity, ContextDescriptor, Scope};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const FETCH_PATH: &str = "/LOCAL_NETWORK/CONFIGURACION/Fetch";
pub const SET_PATH: &str = "/LOCAL_NETWORK/CONFIGURACION/SET";

#[derive(Serialize)]
struct FetchRequest<'a> {
    tablet: &'a ContextDescriptor,
}

#[derive(Serialize)]
struct SetRequest<'a> {
    tablet: &'a ContextDescriptor,
    data: &'a ConfigurationTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
}

/// HTTP client for the configuration service.
///
/// Cheap to share behind an `Arc`; the underlying reqwest client pools
/// connections across tenants.
pub struct RemoteConfigClient {
    client: Client,
    config: RemoteConfig,
}

impl RemoteConfigClient {
    pub fn new(config: RemoteConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RemoteError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, identity: &ConnectionIdentity, path: &str) -> RemoteResult<String> {
        Ok(format!("{}{path}", self.config.base_url_for(identity)?))
    }
}

/// Turns a non-2xx response into [`RemoteError::Rejected`].
async fn check_status(resp: Response) -> RemoteResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteConfigService for RemoteConfigClient {
    async fn fetch_all(
        &self,
        identity: &ConnectionIdentity,
        context: &ContextDescriptor,
    ) -> RemoteResult<ConfigurationTree> {
        let url = self.url(identity, FETCH_PATH)?;
        debug!("POST {url} for {identity}");

        let resp = self
            .client
            .post(&url)
            .json(&FetchRequest { tablet: context })
            .send()
            .await?;
        let bytes = check_status(resp).await?.bytes().await?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::Decode(format!("fetch response: {e}")))?;
        ConfigurationTree::try_from(value).map_err(|other| {
            RemoteError::Decode(format!("fetch response is not an object: {other}"))
        })
    }

    async fn set_keys(
        &self,
        identity: &ConnectionIdentity,
        context: &ContextDescriptor,
        data: &ConfigurationTree,
        scope: Option<Scope>,
    ) -> RemoteResult<()> {
        let url = self.url(identity, SET_PATH)?;
        debug!(
            "PUT {url} for {identity}: {} key(s), scope {scope:?}",
            data.len()
        );

        let resp = self
            .client
            .put(&url)
            .json(&SetRequest {
                tablet: context,
                data,
                scope,
            })
            .send()
            .await?;
        let body = check_status(resp).await?.text().await?;

        // Acknowledgement body carries nothing we use.
        if !body.trim().is_empty()
            && let Err(e) = serde_json::from_str::<serde_json::Value>(&body)
        {
            debug!("ignoring non-JSON set acknowledgement from {url}: {e}");
        }
        Ok(())
    }
}

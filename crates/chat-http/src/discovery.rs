//! Instance discovery
//!
//! The API root describes the instance: the gateway WebSocket URL and the
//! optional feature surfaces (media storage among them). Discovery runs once
//! and is cached; a failure is fatal to client startup.

use chat_common::ClientConfig;
use reqwest::Method;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::error::{ApiError, ApiResult};
use crate::transport::{HttpRequest, SharedTransport};

/// Instance descriptor returned by `GET <api>/`
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceInfo {
    /// Gateway WebSocket URL
    pub ws: String,
    #[serde(default)]
    pub features: InstanceFeatures,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceFeatures {
    /// Media storage surface
    #[serde(default)]
    pub autumn: FeatureToggle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureToggle {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
}

/// Base URLs the client talks to, after applying configured overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub gateway_url: String,
    /// `None` when the instance has no media surface
    pub media_url: Option<String>,
}

impl Endpoints {
    /// Merge discovered URLs with configured overrides
    pub fn resolve(config: &ClientConfig, info: &InstanceInfo) -> Self {
        let discovered_media = info
            .features
            .autumn
            .enabled
            .then(|| info.features.autumn.url.clone())
            .filter(|url| !url.is_empty());

        Self {
            api_url: config.endpoints.api_url.clone(),
            gateway_url: config
                .endpoints
                .gateway_url
                .clone()
                .unwrap_or_else(|| info.ws.clone()),
            media_url: config.endpoints.media_url.clone().or(discovered_media),
        }
    }
}

/// Cached discovery of an instance's endpoints
pub struct Discovery {
    config: ClientConfig,
    transport: SharedTransport,
    endpoints: OnceCell<Endpoints>,
}

impl Discovery {
    pub fn new(config: ClientConfig, transport: SharedTransport) -> Self {
        Self {
            config,
            transport,
            endpoints: OnceCell::new(),
        }
    }

    /// Resolve endpoints, fetching the instance descriptor on first use
    pub async fn endpoints(&self) -> ApiResult<Endpoints> {
        self.endpoints
            .get_or_try_init(|| self.discover())
            .await
            .cloned()
    }

    /// Endpoints if discovery already completed
    pub fn cached(&self) -> Option<&Endpoints> {
        self.endpoints.get()
    }

    async fn discover(&self) -> ApiResult<Endpoints> {
        let url = format!("{}/", self.config.endpoints.api_url.trim_end_matches('/'));
        let response = self
            .transport
            .execute(&HttpRequest::new(Method::GET, url.clone()))
            .await?;

        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                message: response.error_message(),
            });
        }

        let info: InstanceInfo = serde_json::from_str(&response.body)?;
        let endpoints = Endpoints::resolve(&self.config, &info);

        tracing::info!(
            api = %endpoints.api_url,
            gateway = %endpoints.gateway_url,
            media = ?endpoints.media_url,
            "Instance discovered"
        );
        Ok(endpoints)
    }
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("api_url", &self.config.endpoints.api_url)
            .field("endpoints", &self.endpoints.get())
            .finish()
    }
}

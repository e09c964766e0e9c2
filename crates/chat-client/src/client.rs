//! Client facade
//!
//! Wires discovery, the per-surface request queues and the gateway
//! connection together around one shared configuration and entity cache.

use std::sync::Arc;

use chat_cache::{EntityCache, SharedEntityCache};
use chat_common::{system_clock, ClientConfig, SharedClock};
use chat_core::User;
use chat_gateway::{
    ClientEvent, ConnectionState, GatewayConnection, GatewayOptions, SharedConnector,
};
use chat_http::{
    ApiClient, ApiError, Discovery, Endpoints, MediaClient, QueueSettings, RequestQueue,
    ReqwestTransport, SharedTransport, Surface,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::error::ClientResult;

/// Builder for [`Client`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<SharedTransport>,
    connector: Option<SharedConnector>,
    clock: Option<SharedClock>,
    cache: Option<SharedEntityCache>,
}

impl ClientBuilder {
    /// Use a custom HTTP transport for discovery and both request queues
    #[must_use]
    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn with_connector(mut self, connector: SharedConnector) -> Self {
        self.connector = Some(connector);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: SharedEntityCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Discover the instance endpoints and start the request queues
    ///
    /// The gateway driver is spawned but not connected.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be built or discovery fails.
    pub async fn init(self) -> ClientResult<Client> {
        let config = Arc::new(self.config);
        let transport = match self.transport {
            Some(transport) => transport,
            None => ReqwestTransport::new()?.shared(),
        };
        let clock = self.clock.unwrap_or_else(system_clock);
        let cache = self.cache.unwrap_or_else(EntityCache::shared);

        info!(api_url = %config.endpoints.api_url, "Discovering instance endpoints");
        let discovery = Arc::new(Discovery::new((*config).clone(), transport.clone()));
        let endpoints = discovery.endpoints().await?;
        info!(
            gateway_url = %endpoints.gateway_url,
            media_url = ?endpoints.media_url,
            "Instance endpoints resolved"
        );

        let api = ApiClient::new(RequestQueue::spawn(
            QueueSettings::from_config(Surface::Api, endpoints.api_url.clone(), &config),
            transport.clone(),
            clock.clone(),
        ));
        let media = endpoints.media_url.as_ref().map(|url| {
            MediaClient::new(RequestQueue::spawn(
                QueueSettings::from_config(Surface::Media, url.clone(), &config),
                transport.clone(),
                clock.clone(),
            ))
        });

        let mut gateway = GatewayConnection::builder(GatewayOptions::from_config(&config), discovery)
            .with_members(Arc::new(api.clone()))
            .with_cache(cache.clone())
            .with_clock(clock);
        if let Some(connector) = self.connector {
            gateway = gateway.with_connector(connector);
        }

        Ok(Client {
            config,
            endpoints,
            api,
            media,
            gateway: gateway.spawn(),
            cache,
        })
    }
}

/// Connected client
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    endpoints: Endpoints,
    api: ApiClient,
    media: Option<MediaClient>,
    gateway: GatewayConnection,
    cache: SharedEntityCache,
}

impl Client {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            connector: None,
            clock: None,
            cache: None,
        }
    }

    /// Build a client with the default transport, connector and clock
    pub async fn init(config: ClientConfig) -> ClientResult<Self> {
        Self::builder(config).init().await
    }

    /// Connect the gateway; resolves once authenticated
    pub async fn connect(&self) -> ClientResult<()> {
        self.gateway.connect().await?;
        Ok(())
    }

    /// Close the gateway connection for good
    pub async fn destroy(&self) -> ClientResult<()> {
        self.gateway.destroy(true).await?;
        Ok(())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Media surface client
    ///
    /// # Errors
    /// `SurfaceUnavailable` when the instance advertises no media server.
    pub fn media(&self) -> ClientResult<&MediaClient> {
        self.media
            .as_ref()
            .ok_or(ApiError::SurfaceUnavailable(Surface::Media.as_str()).into())
    }

    pub fn gateway(&self) -> &GatewayConnection {
        &self.gateway
    }

    pub fn cache(&self) -> &SharedEntityCache {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.gateway.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.gateway.state()
    }

    pub fn is_ready(&self) -> bool {
        self.gateway.is_ready()
    }

    /// The authenticated user, once Ready has been ingested
    pub fn user(&self) -> Option<User> {
        self.cache.current_user()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoints", &self.endpoints)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

//! Collaborators the connection driver pulls data from
//!
//! The gateway URL comes from an [`EndpointSource`] and the member lists
//! fetched during Ready ingestion come from a [`MemberSource`]. Both are
//! implemented for the HTTP client types and can be replaced in tests.

use async_trait::async_trait;
use chat_http::{ApiClient, Discovery, MemberList};
use std::sync::Arc;

use crate::error::{GatewayError, GatewayResult};

/// Resolves the WebSocket URL to connect to
#[async_trait]
pub trait EndpointSource: Send + Sync {
    async fn gateway_url(&self) -> GatewayResult<String>;
}

/// Fetches the full member list of a server
#[async_trait]
pub trait MemberSource: Send + Sync {
    async fn fetch_members(&self, server_id: &str) -> GatewayResult<MemberList>;
}

pub type SharedEndpointSource = Arc<dyn EndpointSource>;
pub type SharedMemberSource = Arc<dyn MemberSource>;

#[async_trait]
impl EndpointSource for Discovery {
    async fn gateway_url(&self) -> GatewayResult<String> {
        self.endpoints()
            .await
            .map(|endpoints| endpoints.gateway_url)
            .map_err(|e| GatewayError::Discovery(e.to_string()))
    }
}

/// A fixed gateway URL, skipping discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEndpoint(pub String);

impl StaticEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

#[async_trait]
impl EndpointSource for StaticEndpoint {
    async fn gateway_url(&self) -> GatewayResult<String> {
        Ok(self.0.clone())
    }
}

#[async_trait]
impl MemberSource for ApiClient {
    async fn fetch_members(&self, server_id: &str) -> GatewayResult<MemberList> {
        Ok(ApiClient::fetch_members(self, server_id).await?)
    }
}

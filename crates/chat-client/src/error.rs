//! Client error types

use chat_common::ConfigError;
use chat_gateway::GatewayError;
use chat_http::ApiError;

/// Result alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the [`Client`](crate::Client) facade
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ClientError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Api(e) => e.code(),
            Self::Gateway(e) => e.code(),
        }
    }
}

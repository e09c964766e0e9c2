//! Gateway error types
//!
//! Errors are cloneable so they can travel on the event bus as well as
//! settle pending `connect()` and `send()` calls.

use chat_core::DomainError;
use chat_http::ApiError;

/// Result alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Authentication required: no token configured")]
    AuthRequired,

    #[error("Socket is not open")]
    SocketNotOpen,

    /// Reconnect budget exhausted; `connect()` must be called again
    #[error("Gave up reconnecting after {attempts} attempts")]
    MaxRetryExceeded { attempts: u32 },

    /// The socket closed and no reconnect will follow
    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection destroyed")]
    Destroyed,

    /// Malformed inbound frame; the connection stays open
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// `Error` packet sent by the server
    #[error("Server reported error: {0}")]
    Server(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Endpoint discovery failed: {0}")]
    Discovery(String),

    #[error("Request failed: {0}")]
    Request(String),

    /// The connection driver task is no longer running
    #[error("Gateway driver stopped")]
    DriverStopped,
}

impl GatewayError {
    /// Get error code for logs and event consumers
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::SocketNotOpen => "SOCKET_NOT_OPEN",
            Self::MaxRetryExceeded { .. } => "MAX_RETRY_EXCEEDED",
            Self::ConnectionClosed => "CONNECTION_CLOSED",
            Self::Destroyed => "DESTROYED",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Server(_) => "SERVER_ERROR",
            Self::WebSocket(_) => "WEBSOCKET_ERROR",
            Self::Discovery(_) => "DISCOVERY_ERROR",
            Self::Request(_) => "REQUEST_ERROR",
            Self::DriverStopped => "DRIVER_STOPPED",
        }
    }

    /// Fatal errors end the connection lifecycle
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthRequired
                | Self::MaxRetryExceeded { .. }
                | Self::Destroyed
                | Self::Discovery(_)
                | Self::DriverStopped
        )
    }
}

impl From<DomainError> for GatewayError {
    fn from(err: DomainError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<ApiError> for GatewayError {
    fn from(err: ApiError) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for GatewayError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

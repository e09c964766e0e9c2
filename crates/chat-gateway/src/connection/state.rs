//! Connection state
//!
//! The driver task is the only writer; handles read a snapshot.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the gateway connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    /// No socket and nothing scheduled
    #[default]
    Disconnected,
    /// Resolving the endpoint or opening the socket
    Connecting,
    /// Socket open, `Authenticate` sent
    Authenticating,
    /// `Authenticated` received
    Connected,
    /// Waiting for the scheduled reconnect
    Reconnecting,
    /// Closed by the user or out of reconnect attempts
    Destroyed,
}

impl ConnectionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Destroyed => "destroyed",
        }
    }

    /// A connection attempt is underway or scheduled
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::Authenticating | Self::Reconnecting
        )
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the driver's state published for handles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayStatus {
    pub state: ConnectionState,
    pub ready: bool,
    /// Timestamp of the last ping, in clock milliseconds
    pub last_ping: Option<u64>,
    pub socket_open: bool,
    pub retry_count: u32,
}

//! Outbound packets

use serde::{Deserialize, Serialize};

/// Packets sent by the client
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientPacket {
    /// First packet on every new socket
    Authenticate { token: String },
    /// Heartbeat; `data` is the sender's epoch milliseconds
    Ping { data: u64 },
    BeginTyping { channel: String },
    EndTyping { channel: String },
}

impl ClientPacket {
    /// Wire tag of this packet
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authenticate { .. } => "Authenticate",
            Self::Ping { .. } => "Ping",
            Self::BeginTyping { .. } => "BeginTyping",
            Self::EndTyping { .. } => "EndTyping",
        }
    }

    /// Encode as a text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Debug for ClientPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authenticate { .. } => f
                .debug_struct("Authenticate")
                .field("token", &"<redacted>")
                .finish(),
            Self::Ping { data } => f.debug_struct("Ping").field("data", data).finish(),
            Self::BeginTyping { channel } => {
                f.debug_struct("BeginTyping").field("channel", channel).finish()
            }
            Self::EndTyping { channel } => {
                f.debug_struct("EndTyping").field("channel", channel).finish()
            }
        }
    }
}

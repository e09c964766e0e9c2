//! Voice state entities

use serde::{Deserialize, Serialize};

/// One user's state inside a voice channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceState {
    /// User ID
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub is_receiving: bool,
    #[serde(default)]
    pub is_publishing: bool,
    #[serde(default)]
    pub screensharing: bool,
    #[serde(default)]
    pub camera: bool,
}

impl VoiceState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            id: user_id.into(),
            joined_at: None,
            is_receiving: true,
            is_publishing: false,
            screensharing: false,
            camera: false,
        }
    }
}

/// Participants of a voice channel, as delivered in the Ready snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelVoiceState {
    /// Channel ID
    pub id: String,
    #[serde(default)]
    pub participants: Vec<VoiceState>,
}

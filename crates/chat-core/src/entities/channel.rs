//! Channel entity - saved notes, direct messages, groups and server channels

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Attachment, PermissionOverride};

/// Channel entity, discriminated by `channel_type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel_type")]
pub enum Channel {
    /// Personal notes channel of a single user
    SavedMessages {
        #[serde(rename = "_id")]
        id: String,
        user: String,
    },
    /// Direct message between two users
    DirectMessage {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_message_id: Option<String>,
    },
    /// Group direct message
    Group {
        #[serde(rename = "_id")]
        id: String,
        name: String,
        owner: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        recipients: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<Attachment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permissions: Option<i64>,
        #[serde(default)]
        nsfw: bool,
    },
    /// Text channel inside a server
    TextChannel {
        #[serde(rename = "_id")]
        id: String,
        server: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<Attachment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_message_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_permissions: Option<PermissionOverride>,
        #[serde(default)]
        role_permissions: HashMap<String, PermissionOverride>,
        #[serde(default)]
        nsfw: bool,
    },
    /// Voice channel inside a server
    VoiceChannel {
        #[serde(rename = "_id")]
        id: String,
        server: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<Attachment>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_permissions: Option<PermissionOverride>,
        #[serde(default)]
        role_permissions: HashMap<String, PermissionOverride>,
        #[serde(default)]
        nsfw: bool,
    },
}

impl Channel {
    /// Get the channel ID
    pub fn id(&self) -> &str {
        match self {
            Self::SavedMessages { id, .. }
            | Self::DirectMessage { id, .. }
            | Self::Group { id, .. }
            | Self::TextChannel { id, .. }
            | Self::VoiceChannel { id, .. } => id,
        }
    }

    /// Server this channel belongs to, if any
    pub fn server(&self) -> Option<&str> {
        match self {
            Self::TextChannel { server, .. } | Self::VoiceChannel { server, .. } => Some(server),
            _ => None,
        }
    }

    /// Channel name, if the channel type has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Group { name, .. }
            | Self::TextChannel { name, .. }
            | Self::VoiceChannel { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Users taking part in a DM or group
    pub fn recipients(&self) -> &[String] {
        match self {
            Self::DirectMessage { recipients, .. } | Self::Group { recipients, .. } => recipients,
            _ => &[],
        }
    }

    /// Mutable recipients list for DMs and groups
    pub fn recipients_mut(&mut self) -> Option<&mut Vec<String>> {
        match self {
            Self::DirectMessage { recipients, .. } | Self::Group { recipients, .. } => {
                Some(recipients)
            }
            _ => None,
        }
    }

    /// Record the latest message posted in this channel
    pub fn set_last_message(&mut self, message_id: &str) {
        match self {
            Self::DirectMessage {
                last_message_id, ..
            }
            | Self::Group {
                last_message_id, ..
            }
            | Self::TextChannel {
                last_message_id, ..
            } => *last_message_id = Some(message_id.to_string()),
            _ => {}
        }
    }

    /// Check if this is a voice channel
    #[inline]
    pub fn is_voice(&self) -> bool {
        matches!(self, Self::VoiceChannel { .. })
    }
}

//! Inbound packets
//!
//! Frames are decoded in two steps: the `type` tag is looked up first so an
//! unknown tag can be dropped quietly, then the body is decoded into the
//! typed packet. A known tag with a malformed body is a protocol error.

use chat_core::{
    Channel, ChannelVoiceState, Emoji, Member, MemberId, Message, Server, User, VoiceState,
    Webhook,
};
use serde::Deserialize;
use serde_json::Value;

use super::PacketKind;
use crate::error::{GatewayError, GatewayResult};

/// Initial state delivered after authentication
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyPayload {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub emojis: Vec<Emoji>,
    #[serde(default)]
    pub voice_states: Vec<ChannelVoiceState>,
}

/// Embeds appended to an existing message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageAppendData {
    #[serde(default)]
    pub embeds: Vec<Value>,
}

/// Packets sent by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerPacket {
    Authenticated,
    Pong {
        #[serde(default)]
        data: Option<Value>,
    },
    Error {
        error: Value,
    },
    Bulk {
        v: Vec<Value>,
    },
    Ready(Box<ReadyPayload>),

    Message(Box<Message>),
    MessageUpdate {
        id: String,
        channel: String,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    MessageAppend {
        id: String,
        channel: String,
        append: MessageAppendData,
    },
    MessageDelete {
        id: String,
        channel: String,
    },
    BulkMessageDelete {
        channel: String,
        ids: Vec<String>,
    },
    MessageReact {
        id: String,
        channel_id: String,
        user_id: String,
        emoji_id: String,
    },
    MessageUnreact {
        id: String,
        channel_id: String,
        user_id: String,
        emoji_id: String,
    },
    MessageRemoveReaction {
        id: String,
        channel_id: String,
        emoji_id: String,
    },

    ChannelCreate(Box<Channel>),
    ChannelUpdate {
        id: String,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    ChannelDelete {
        id: String,
    },
    ChannelGroupJoin {
        id: String,
        user: String,
    },
    ChannelGroupLeave {
        id: String,
        user: String,
    },
    ChannelStartTyping {
        id: String,
        user: String,
    },
    ChannelStopTyping {
        id: String,
        user: String,
    },
    ChannelAck {
        id: String,
        user: String,
        message_id: String,
    },

    ServerCreate {
        id: String,
        server: Box<Server>,
        #[serde(default)]
        channels: Vec<Channel>,
        #[serde(default)]
        emojis: Vec<Emoji>,
    },
    ServerUpdate {
        id: String,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    ServerDelete {
        id: String,
    },
    ServerMemberJoin {
        id: String,
        user: String,
    },
    ServerMemberUpdate {
        id: MemberId,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    ServerMemberLeave {
        id: String,
        user: String,
    },
    ServerRoleUpdate {
        id: String,
        role_id: String,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    ServerRoleDelete {
        id: String,
        role_id: String,
    },

    UserUpdate {
        id: String,
        data: Value,
        #[serde(default)]
        clear: Vec<String>,
    },
    UserRelationship {
        id: String,
        user: Box<User>,
    },
    UserPlatformWipe {
        user_id: String,
        #[serde(default)]
        flags: u32,
    },

    EmojiCreate(Box<Emoji>),
    EmojiDelete {
        id: String,
    },

    WebhookCreate(Box<Webhook>),
    WebhookUpdate {
        id: String,
        data: Value,
        #[serde(default)]
        remove: Vec<String>,
    },
    WebhookDelete {
        id: String,
    },

    VoiceChannelJoin {
        id: String,
        state: VoiceState,
    },
    VoiceChannelLeave {
        id: String,
        user: String,
    },
    UserVoiceStateUpdate {
        id: String,
        channel_id: String,
        data: Value,
    },
}

impl ServerPacket {
    /// Kind of this packet
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Authenticated => PacketKind::Authenticated,
            Self::Pong { .. } => PacketKind::Pong,
            Self::Error { .. } => PacketKind::Error,
            Self::Bulk { .. } => PacketKind::Bulk,
            Self::Ready(_) => PacketKind::Ready,
            Self::Message(_) => PacketKind::Message,
            Self::MessageUpdate { .. } => PacketKind::MessageUpdate,
            Self::MessageAppend { .. } => PacketKind::MessageAppend,
            Self::MessageDelete { .. } => PacketKind::MessageDelete,
            Self::BulkMessageDelete { .. } => PacketKind::BulkMessageDelete,
            Self::MessageReact { .. } => PacketKind::MessageReact,
            Self::MessageUnreact { .. } => PacketKind::MessageUnreact,
            Self::MessageRemoveReaction { .. } => PacketKind::MessageRemoveReaction,
            Self::ChannelCreate(_) => PacketKind::ChannelCreate,
            Self::ChannelUpdate { .. } => PacketKind::ChannelUpdate,
            Self::ChannelDelete { .. } => PacketKind::ChannelDelete,
            Self::ChannelGroupJoin { .. } => PacketKind::ChannelGroupJoin,
            Self::ChannelGroupLeave { .. } => PacketKind::ChannelGroupLeave,
            Self::ChannelStartTyping { .. } => PacketKind::ChannelStartTyping,
            Self::ChannelStopTyping { .. } => PacketKind::ChannelStopTyping,
            Self::ChannelAck { .. } => PacketKind::ChannelAck,
            Self::ServerCreate { .. } => PacketKind::ServerCreate,
            Self::ServerUpdate { .. } => PacketKind::ServerUpdate,
            Self::ServerDelete { .. } => PacketKind::ServerDelete,
            Self::ServerMemberJoin { .. } => PacketKind::ServerMemberJoin,
            Self::ServerMemberUpdate { .. } => PacketKind::ServerMemberUpdate,
            Self::ServerMemberLeave { .. } => PacketKind::ServerMemberLeave,
            Self::ServerRoleUpdate { .. } => PacketKind::ServerRoleUpdate,
            Self::ServerRoleDelete { .. } => PacketKind::ServerRoleDelete,
            Self::UserUpdate { .. } => PacketKind::UserUpdate,
            Self::UserRelationship { .. } => PacketKind::UserRelationship,
            Self::UserPlatformWipe { .. } => PacketKind::UserPlatformWipe,
            Self::EmojiCreate(_) => PacketKind::EmojiCreate,
            Self::EmojiDelete { .. } => PacketKind::EmojiDelete,
            Self::WebhookCreate(_) => PacketKind::WebhookCreate,
            Self::WebhookUpdate { .. } => PacketKind::WebhookUpdate,
            Self::WebhookDelete { .. } => PacketKind::WebhookDelete,
            Self::VoiceChannelJoin { .. } => PacketKind::VoiceChannelJoin,
            Self::VoiceChannelLeave { .. } => PacketKind::VoiceChannelLeave,
            Self::UserVoiceStateUpdate { .. } => PacketKind::UserVoiceStateUpdate,
        }
    }
}

/// Outcome of decoding one packet value
#[derive(Debug)]
pub enum Decoded {
    Packet(ServerPacket),
    /// Tag not understood by this client
    Unknown(String),
}

/// Parse a text frame into a JSON value
pub fn parse_frame(text: &str) -> GatewayResult<Value> {
    serde_json::from_str(text).map_err(|e| GatewayError::Protocol(format!("malformed frame: {e}")))
}

/// Decode one packet value
pub fn decode_packet(value: Value) -> GatewayResult<Decoded> {
    let tag = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::Protocol("packet without a type tag".to_string()))?;

    let Some(kind) = PacketKind::from_str(tag) else {
        return Ok(Decoded::Unknown(tag.to_string()));
    };

    serde_json::from_value(value)
        .map(Decoded::Packet)
        .map_err(|e| GatewayError::Protocol(format!("invalid {kind} packet: {e}")))
}

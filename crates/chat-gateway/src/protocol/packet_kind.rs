//! Inbound packet kinds
//!
//! Every `type` tag the client understands. Frames with any other tag are
//! logged and dropped.

use std::fmt;

/// Inbound packet type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    // Connection
    Authenticated,
    Pong,
    Error,
    Bulk,
    Ready,

    // Messages
    Message,
    MessageUpdate,
    MessageAppend,
    MessageDelete,
    BulkMessageDelete,
    MessageReact,
    MessageUnreact,
    MessageRemoveReaction,

    // Channels
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,
    ChannelGroupJoin,
    ChannelGroupLeave,
    ChannelStartTyping,
    ChannelStopTyping,
    ChannelAck,

    // Servers
    ServerCreate,
    ServerUpdate,
    ServerDelete,
    ServerMemberJoin,
    ServerMemberUpdate,
    ServerMemberLeave,
    ServerRoleUpdate,
    ServerRoleDelete,

    // Users
    UserUpdate,
    UserRelationship,
    UserPlatformWipe,

    // Emojis
    EmojiCreate,
    EmojiDelete,

    // Webhooks
    WebhookCreate,
    WebhookUpdate,
    WebhookDelete,

    // Voice
    VoiceChannelJoin,
    VoiceChannelLeave,
    UserVoiceStateUpdate,
}

impl PacketKind {
    /// Wire tag of this packet kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticated => "Authenticated",
            Self::Pong => "Pong",
            Self::Error => "Error",
            Self::Bulk => "Bulk",
            Self::Ready => "Ready",
            Self::Message => "Message",
            Self::MessageUpdate => "MessageUpdate",
            Self::MessageAppend => "MessageAppend",
            Self::MessageDelete => "MessageDelete",
            Self::BulkMessageDelete => "BulkMessageDelete",
            Self::MessageReact => "MessageReact",
            Self::MessageUnreact => "MessageUnreact",
            Self::MessageRemoveReaction => "MessageRemoveReaction",
            Self::ChannelCreate => "ChannelCreate",
            Self::ChannelUpdate => "ChannelUpdate",
            Self::ChannelDelete => "ChannelDelete",
            Self::ChannelGroupJoin => "ChannelGroupJoin",
            Self::ChannelGroupLeave => "ChannelGroupLeave",
            Self::ChannelStartTyping => "ChannelStartTyping",
            Self::ChannelStopTyping => "ChannelStopTyping",
            Self::ChannelAck => "ChannelAck",
            Self::ServerCreate => "ServerCreate",
            Self::ServerUpdate => "ServerUpdate",
            Self::ServerDelete => "ServerDelete",
            Self::ServerMemberJoin => "ServerMemberJoin",
            Self::ServerMemberUpdate => "ServerMemberUpdate",
            Self::ServerMemberLeave => "ServerMemberLeave",
            Self::ServerRoleUpdate => "ServerRoleUpdate",
            Self::ServerRoleDelete => "ServerRoleDelete",
            Self::UserUpdate => "UserUpdate",
            Self::UserRelationship => "UserRelationship",
            Self::UserPlatformWipe => "UserPlatformWipe",
            Self::EmojiCreate => "EmojiCreate",
            Self::EmojiDelete => "EmojiDelete",
            Self::WebhookCreate => "WebhookCreate",
            Self::WebhookUpdate => "WebhookUpdate",
            Self::WebhookDelete => "WebhookDelete",
            Self::VoiceChannelJoin => "VoiceChannelJoin",
            Self::VoiceChannelLeave => "VoiceChannelLeave",
            Self::UserVoiceStateUpdate => "UserVoiceStateUpdate",
        }
    }

    /// Parse a wire tag
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Authenticated" => Some(Self::Authenticated),
            "Pong" => Some(Self::Pong),
            "Error" => Some(Self::Error),
            "Bulk" => Some(Self::Bulk),
            "Ready" => Some(Self::Ready),
            "Message" => Some(Self::Message),
            "MessageUpdate" => Some(Self::MessageUpdate),
            "MessageAppend" => Some(Self::MessageAppend),
            "MessageDelete" => Some(Self::MessageDelete),
            "BulkMessageDelete" => Some(Self::BulkMessageDelete),
            "MessageReact" => Some(Self::MessageReact),
            "MessageUnreact" => Some(Self::MessageUnreact),
            "MessageRemoveReaction" => Some(Self::MessageRemoveReaction),
            "ChannelCreate" => Some(Self::ChannelCreate),
            "ChannelUpdate" => Some(Self::ChannelUpdate),
            "ChannelDelete" => Some(Self::ChannelDelete),
            "ChannelGroupJoin" => Some(Self::ChannelGroupJoin),
            "ChannelGroupLeave" => Some(Self::ChannelGroupLeave),
            "ChannelStartTyping" => Some(Self::ChannelStartTyping),
            "ChannelStopTyping" => Some(Self::ChannelStopTyping),
            "ChannelAck" => Some(Self::ChannelAck),
            "ServerCreate" => Some(Self::ServerCreate),
            "ServerUpdate" => Some(Self::ServerUpdate),
            "ServerDelete" => Some(Self::ServerDelete),
            "ServerMemberJoin" => Some(Self::ServerMemberJoin),
            "ServerMemberUpdate" => Some(Self::ServerMemberUpdate),
            "ServerMemberLeave" => Some(Self::ServerMemberLeave),
            "ServerRoleUpdate" => Some(Self::ServerRoleUpdate),
            "ServerRoleDelete" => Some(Self::ServerRoleDelete),
            "UserUpdate" => Some(Self::UserUpdate),
            "UserRelationship" => Some(Self::UserRelationship),
            "UserPlatformWipe" => Some(Self::UserPlatformWipe),
            "EmojiCreate" => Some(Self::EmojiCreate),
            "EmojiDelete" => Some(Self::EmojiDelete),
            "WebhookCreate" => Some(Self::WebhookCreate),
            "WebhookUpdate" => Some(Self::WebhookUpdate),
            "WebhookDelete" => Some(Self::WebhookDelete),
            "VoiceChannelJoin" => Some(Self::VoiceChannelJoin),
            "VoiceChannelLeave" => Some(Self::VoiceChannelLeave),
            "UserVoiceStateUpdate" => Some(Self::UserVoiceStateUpdate),
            _ => None,
        }
    }

    /// Packets that drive the connection itself rather than entity state
    #[must_use]
    pub const fn is_control(self) -> bool {
        matches!(
            self,
            Self::Authenticated | Self::Pong | Self::Error | Self::Bulk | Self::Ready
        )
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

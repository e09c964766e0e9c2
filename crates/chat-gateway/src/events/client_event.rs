//! Events published to client consumers

use chat_core::{Channel, Emoji, Member, Message, Role, Server, User, VoiceState, Webhook};

use crate::connection::ConnectionState;
use crate::error::GatewayError;

/// Event published on the client event bus
///
/// Update events carry the entity after the change was applied to the cache.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    // Connection
    /// The connection moved to a new lifecycle state
    State(ConnectionState),
    /// Ready snapshot ingested; caches are populated
    Ready,
    /// Gateway-level error; fatal ones also settle pending `connect()` calls
    Error(GatewayError),

    // Messages
    Message(Box<Message>),
    MessageUpdate(Box<Message>),
    MessageDelete {
        channel_id: String,
        message_id: String,
    },
    MessageDeleteBulk {
        channel_id: String,
        message_ids: Vec<String>,
    },
    MessageReact {
        channel_id: String,
        message_id: String,
        user_id: String,
        emoji_id: String,
    },
    MessageUnreact {
        channel_id: String,
        message_id: String,
        user_id: String,
        emoji_id: String,
    },
    MessageClearReaction {
        channel_id: String,
        message_id: String,
        emoji_id: String,
    },

    // Channels
    ChannelCreate(Box<Channel>),
    ChannelUpdate(Box<Channel>),
    ChannelDelete {
        channel_id: String,
    },
    ChannelGroupJoin {
        channel_id: String,
        user_id: String,
    },
    ChannelGroupLeave {
        channel_id: String,
        user_id: String,
    },
    ChannelStartTyping {
        channel_id: String,
        user_id: String,
    },
    ChannelStopTyping {
        channel_id: String,
        user_id: String,
    },
    ChannelAck {
        channel_id: String,
        user_id: String,
        message_id: String,
    },

    // Servers
    ServerCreate(Box<Server>),
    ServerUpdate(Box<Server>),
    ServerDelete {
        server_id: String,
    },
    ServerMemberJoin(Box<Member>),
    ServerMemberUpdate(Box<Member>),
    ServerMemberLeave {
        server_id: String,
        user_id: String,
    },
    ServerRoleUpdate {
        server_id: String,
        role_id: String,
        role: Role,
    },
    ServerRoleDelete {
        server_id: String,
        role_id: String,
    },

    // Users
    UserUpdate(Box<User>),
    UserRelationship(Box<User>),
    UserPlatformWipe {
        user_id: String,
    },

    // Emojis
    EmojiCreate(Box<Emoji>),
    EmojiDelete {
        emoji_id: String,
    },

    // Webhooks
    WebhookCreate(Box<Webhook>),
    WebhookUpdate(Box<Webhook>),
    WebhookDelete {
        webhook_id: String,
    },

    // Voice
    VoiceChannelJoin {
        channel_id: String,
        state: VoiceState,
    },
    VoiceChannelLeave {
        channel_id: String,
        user_id: String,
    },
    UserVoiceStateUpdate {
        channel_id: String,
        state: VoiceState,
    },
}

impl ClientEvent {
    /// Event name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
            Self::Ready => "ready",
            Self::Error(_) => "error",
            Self::Message(_) => "message",
            Self::MessageUpdate(_) => "message_update",
            Self::MessageDelete { .. } => "message_delete",
            Self::MessageDeleteBulk { .. } => "message_delete_bulk",
            Self::MessageReact { .. } => "message_react",
            Self::MessageUnreact { .. } => "message_unreact",
            Self::MessageClearReaction { .. } => "message_clear_reaction",
            Self::ChannelCreate(_) => "channel_create",
            Self::ChannelUpdate(_) => "channel_update",
            Self::ChannelDelete { .. } => "channel_delete",
            Self::ChannelGroupJoin { .. } => "channel_group_join",
            Self::ChannelGroupLeave { .. } => "channel_group_leave",
            Self::ChannelStartTyping { .. } => "channel_start_typing",
            Self::ChannelStopTyping { .. } => "channel_stop_typing",
            Self::ChannelAck { .. } => "channel_ack",
            Self::ServerCreate(_) => "server_create",
            Self::ServerUpdate(_) => "server_update",
            Self::ServerDelete { .. } => "server_delete",
            Self::ServerMemberJoin(_) => "server_member_join",
            Self::ServerMemberUpdate(_) => "server_member_update",
            Self::ServerMemberLeave { .. } => "server_member_leave",
            Self::ServerRoleUpdate { .. } => "server_role_update",
            Self::ServerRoleDelete { .. } => "server_role_delete",
            Self::UserUpdate(_) => "user_update",
            Self::UserRelationship(_) => "user_relationship",
            Self::UserPlatformWipe { .. } => "user_platform_wipe",
            Self::EmojiCreate(_) => "emoji_create",
            Self::EmojiDelete { .. } => "emoji_delete",
            Self::WebhookCreate(_) => "webhook_create",
            Self::WebhookUpdate(_) => "webhook_update",
            Self::WebhookDelete { .. } => "webhook_delete",
            Self::VoiceChannelJoin { .. } => "voice_channel_join",
            Self::VoiceChannelLeave { .. } => "voice_channel_leave",
            Self::UserVoiceStateUpdate { .. } => "user_voice_state_update",
        }
    }
}

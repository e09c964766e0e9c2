//! # chat-core
//!
//! Domain layer containing the entities exchanged with the chat platform and
//! the partial-update rules applied to them.
//! This crate has zero dependencies on infrastructure (network, runtime, etc.).

pub mod entities;
pub mod error;
pub mod partial;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, BotInformation, Channel, ChannelVoiceState, Emoji, EmojiParent, Member, MemberId,
    Message, MessageWebhook, PermissionOverride, Presence, RelationshipStatus, Role, Server, User,
    UserStatus, VoiceState, Webhook,
};
pub use error::DomainError;
pub use partial::apply_partial;

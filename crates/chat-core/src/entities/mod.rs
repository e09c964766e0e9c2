//! Domain entities - objects decoded from the API and the gateway

mod attachment;
mod channel;
mod emoji;
mod member;
mod message;
mod role;
mod server;
mod user;
mod voice;
mod webhook;

pub use attachment::Attachment;
pub use channel::Channel;
pub use emoji::{Emoji, EmojiParent};
pub use member::{Member, MemberId};
pub use message::{Message, MessageWebhook};
pub use role::{PermissionOverride, Role};
pub use server::Server;
pub use user::{BotInformation, Presence, RelationshipStatus, User, UserStatus};
pub use voice::{ChannelVoiceState, VoiceState};
pub use webhook::Webhook;

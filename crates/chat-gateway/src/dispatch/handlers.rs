//! Domain packet handlers
//!
//! Each packet kind maps to exactly one arm: apply the change to the entity
//! cache, then describe it as a [`ClientEvent`]. Partial updates for
//! entities that are not cached are skipped.

use chat_cache::EntityCache;
use chat_core::{apply_partial, Member, MemberId, Role};

use crate::error::GatewayResult;
use crate::events::ClientEvent;
use crate::protocol::ServerPacket;

/// Apply a domain packet to the cache
///
/// Returns the event to publish, if any. Connection packets (`Authenticated`,
/// `Pong`, `Error`, `Bulk`, `Ready`) are handled by the driver and yield
/// nothing here.
pub fn apply(cache: &EntityCache, packet: ServerPacket) -> GatewayResult<Option<ClientEvent>> {
    let event = match packet {
        // Messages
        ServerPacket::Message(message) => {
            cache.insert_message((*message).clone());
            Some(ClientEvent::Message(message))
        }
        ServerPacket::MessageUpdate {
            id, data, clear, ..
        } => cache
            .messages()
            .patch(&id, &data, &clear)?
            .map(|message| ClientEvent::MessageUpdate(Box::new(message))),
        ServerPacket::MessageAppend { id, append, .. } => {
            let updated = cache.messages().update(&id, |message| {
                message.append_embeds(append.embeds);
                message.clone()
            });
            updated.map(|message| ClientEvent::MessageUpdate(Box::new(message)))
        }
        ServerPacket::MessageDelete { id, channel } => {
            cache.messages().remove(&id);
            Some(ClientEvent::MessageDelete {
                channel_id: channel,
                message_id: id,
            })
        }
        ServerPacket::BulkMessageDelete { channel, ids } => {
            for id in &ids {
                cache.messages().remove(id);
            }
            Some(ClientEvent::MessageDeleteBulk {
                channel_id: channel,
                message_ids: ids,
            })
        }
        ServerPacket::MessageReact {
            id,
            channel_id,
            user_id,
            emoji_id,
        } => {
            cache
                .messages()
                .update(&id, |message| message.add_reaction(&emoji_id, &user_id));
            Some(ClientEvent::MessageReact {
                channel_id,
                message_id: id,
                user_id,
                emoji_id,
            })
        }
        ServerPacket::MessageUnreact {
            id,
            channel_id,
            user_id,
            emoji_id,
        } => {
            cache
                .messages()
                .update(&id, |message| message.remove_reaction(&emoji_id, &user_id));
            Some(ClientEvent::MessageUnreact {
                channel_id,
                message_id: id,
                user_id,
                emoji_id,
            })
        }
        ServerPacket::MessageRemoveReaction {
            id,
            channel_id,
            emoji_id,
        } => {
            cache
                .messages()
                .update(&id, |message| message.clear_reaction(&emoji_id));
            Some(ClientEvent::MessageClearReaction {
                channel_id,
                message_id: id,
                emoji_id,
            })
        }

        // Channels
        ServerPacket::ChannelCreate(channel) => {
            if let Some(server_id) = channel.server() {
                let channel_id = channel.id().to_string();
                cache.servers().update(server_id, |server| {
                    if !server.channels.contains(&channel_id) {
                        server.channels.push(channel_id);
                    }
                });
            }
            cache.insert_channel((*channel).clone());
            Some(ClientEvent::ChannelCreate(channel))
        }
        ServerPacket::ChannelUpdate { id, data, clear } => cache
            .channels()
            .patch(&id, &data, &clear)?
            .map(|channel| ClientEvent::ChannelUpdate(Box::new(channel))),
        ServerPacket::ChannelDelete { id } => {
            if let Some(channel) = cache.channels().remove(&id) {
                if let Some(server_id) = channel.server() {
                    cache
                        .servers()
                        .update(server_id, |server| server.channels.retain(|c| c != &id));
                }
            }
            Some(ClientEvent::ChannelDelete { channel_id: id })
        }
        ServerPacket::ChannelGroupJoin { id, user } => {
            cache.channels().update(&id, |channel| {
                if let Some(recipients) = channel.recipients_mut() {
                    if !recipients.contains(&user) {
                        recipients.push(user.clone());
                    }
                }
            });
            Some(ClientEvent::ChannelGroupJoin {
                channel_id: id,
                user_id: user,
            })
        }
        ServerPacket::ChannelGroupLeave { id, user } => {
            cache.channels().update(&id, |channel| {
                if let Some(recipients) = channel.recipients_mut() {
                    recipients.retain(|r| r != &user);
                }
            });
            Some(ClientEvent::ChannelGroupLeave {
                channel_id: id,
                user_id: user,
            })
        }
        ServerPacket::ChannelStartTyping { id, user } => Some(ClientEvent::ChannelStartTyping {
            channel_id: id,
            user_id: user,
        }),
        ServerPacket::ChannelStopTyping { id, user } => Some(ClientEvent::ChannelStopTyping {
            channel_id: id,
            user_id: user,
        }),
        ServerPacket::ChannelAck {
            id,
            user,
            message_id,
        } => Some(ClientEvent::ChannelAck {
            channel_id: id,
            user_id: user,
            message_id,
        }),

        // Servers
        ServerPacket::ServerCreate {
            server,
            channels,
            emojis,
            ..
        } => {
            for channel in channels {
                cache.insert_channel(channel);
            }
            for emoji in emojis {
                cache.insert_emoji(emoji);
            }
            cache.insert_server((*server).clone());
            Some(ClientEvent::ServerCreate(server))
        }
        ServerPacket::ServerUpdate { id, data, clear } => cache
            .servers()
            .patch(&id, &data, &clear)?
            .map(|server| ClientEvent::ServerUpdate(Box::new(server))),
        ServerPacket::ServerDelete { id } => {
            cache.remove_server(&id);
            Some(ClientEvent::ServerDelete { server_id: id })
        }
        ServerPacket::ServerMemberJoin { id, user } => {
            let member = Member::new(MemberId::new(id, user));
            cache.insert_member(member.clone());
            Some(ClientEvent::ServerMemberJoin(Box::new(member)))
        }
        ServerPacket::ServerMemberUpdate { id, data, clear } => cache
            .patch_member(&id, &data, &clear)?
            .map(|member| ClientEvent::ServerMemberUpdate(Box::new(member))),
        ServerPacket::ServerMemberLeave { id, user } => {
            if cache.current_user_id().as_deref() == Some(user.as_str()) {
                cache.remove_server(&id);
            } else {
                cache.remove_member(&id, &user);
            }
            Some(ClientEvent::ServerMemberLeave {
                server_id: id,
                user_id: user,
            })
        }
        ServerPacket::ServerRoleUpdate {
            id,
            role_id,
            data,
            clear,
        } => {
            let Some(server) = cache.servers().get(&id) else {
                return Ok(None);
            };
            let current = server
                .roles
                .get(&role_id)
                .cloned()
                .unwrap_or_else(|| Role::new(""));
            let role = apply_partial(&current, "role", &data, &clear)?;

            cache.servers().update(&id, |server| {
                server.roles.insert(role_id.clone(), role.clone());
            });
            Some(ClientEvent::ServerRoleUpdate {
                server_id: id,
                role_id,
                role,
            })
        }
        ServerPacket::ServerRoleDelete { id, role_id } => {
            cache.servers().update(&id, |server| {
                server.roles.remove(&role_id);
            });
            for mut member in cache.members_of(&id) {
                if member.has_role(&role_id) {
                    member.roles.retain(|r| r != &role_id);
                    cache.insert_member(member);
                }
            }
            Some(ClientEvent::ServerRoleDelete {
                server_id: id,
                role_id,
            })
        }

        // Users
        ServerPacket::UserUpdate { id, data, clear } => cache
            .users()
            .patch(&id, &data, &clear)?
            .map(|user| ClientEvent::UserUpdate(Box::new(user))),
        ServerPacket::UserRelationship { user, .. } => {
            cache.insert_user((*user).clone());
            Some(ClientEvent::UserRelationship(user))
        }
        ServerPacket::UserPlatformWipe { user_id, flags } => {
            cache.users().update(&user_id, |user| user.flags = flags);
            cache
                .messages()
                .remove_where(|_, message| message.author == user_id);
            Some(ClientEvent::UserPlatformWipe { user_id })
        }

        // Emojis
        ServerPacket::EmojiCreate(emoji) => {
            cache.insert_emoji((*emoji).clone());
            Some(ClientEvent::EmojiCreate(emoji))
        }
        ServerPacket::EmojiDelete { id } => {
            cache.emojis().remove(&id);
            Some(ClientEvent::EmojiDelete { emoji_id: id })
        }

        // Webhooks
        ServerPacket::WebhookCreate(webhook) => {
            cache.insert_webhook((*webhook).clone());
            Some(ClientEvent::WebhookCreate(webhook))
        }
        ServerPacket::WebhookUpdate { id, data, remove } => cache
            .webhooks()
            .patch(&id, &data, &remove)?
            .map(|webhook| ClientEvent::WebhookUpdate(Box::new(webhook))),
        ServerPacket::WebhookDelete { id } => {
            cache.webhooks().remove(&id);
            Some(ClientEvent::WebhookDelete { webhook_id: id })
        }

        // Voice
        ServerPacket::VoiceChannelJoin { id, state } => {
            cache.voice_join(&id, state.clone());
            Some(ClientEvent::VoiceChannelJoin {
                channel_id: id,
                state,
            })
        }
        ServerPacket::VoiceChannelLeave { id, user } => {
            cache.voice_leave(&id, &user);
            Some(ClientEvent::VoiceChannelLeave {
                channel_id: id,
                user_id: user,
            })
        }
        ServerPacket::UserVoiceStateUpdate {
            id,
            channel_id,
            data,
        } => cache
            .patch_voice_state(&channel_id, &id, &data)?
            .map(|state| ClientEvent::UserVoiceStateUpdate { channel_id, state }),

        // Handled by the connection driver
        ServerPacket::Authenticated
        | ServerPacket::Pong { .. }
        | ServerPacket::Error { .. }
        | ServerPacket::Bulk { .. }
        | ServerPacket::Ready(_) => None,
    };

    Ok(event)
}
